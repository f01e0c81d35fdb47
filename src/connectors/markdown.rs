// Markdown → Notion rich_text.
// Handles **bold**, *italic*, `code` and "- " bullets (rendered as "• ").
// Unclosed markers are kept as literal text.

use serde_json::{json, Map, Value};

pub fn markdown_to_rich_text(md: &str) -> Vec<Value> {
    let lines: Vec<&str> = md.split('\n').collect();
    let mut out = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let stripped = line.trim();
        match stripped.strip_prefix("- ") {
            Some(rest) => inline(&format!("• {}", rest), &mut out),
            None => inline(line, &mut out),
        }
        if idx + 1 != lines.len() {
            out.push(plain("\n"));
        }
    }

    if out.is_empty() {
        out.push(plain(""));
    }
    out
}

fn plain(content: &str) -> Value {
    json!({"text": {"content": content}})
}

fn annotated(content: &str, annotation: &str) -> Value {
    let mut annotations = Map::new();
    annotations.insert(annotation.to_string(), Value::Bool(true));
    json!({"text": {"content": content}, "annotations": annotations})
}

fn flush(buf: &mut String, out: &mut Vec<Value>) {
    if !buf.is_empty() {
        out.push(plain(buf));
        buf.clear();
    }
}

fn inline(text: &str, out: &mut Vec<Value>) {
    let chars: Vec<char> = text.chars().collect();
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let span = if chars[i] == '`' {
            find(&chars, "`", i + 1).map(|end| (i + 1, end, end + 1, "code"))
        } else if starts_with(&chars, i, "**") {
            find(&chars, "**", i + 2).map(|end| (i + 2, end, end + 2, "bold"))
        } else if chars[i] == '*' {
            find(&chars, "*", i + 1).map(|end| (i + 1, end, end + 1, "italic"))
        } else {
            None
        };

        match span {
            Some((start, end, next, annotation)) => {
                flush(&mut buf, out);
                let content: String = chars[start..end].iter().collect();
                out.push(annotated(&content, annotation));
                i = next;
            }
            None => {
                buf.push(chars[i]);
                i += 1;
            }
        }
    }
    flush(&mut buf, out);
}

fn starts_with(chars: &[char], at: usize, pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    chars.len() >= at + pat.len() && chars[at..at + pat.len()] == pat[..]
}

fn find(chars: &[char], pat: &str, from: usize) -> Option<usize> {
    (from..chars.len()).find(|&j| starts_with(chars, j, pat))
}
