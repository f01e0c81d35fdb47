// Atom feed parsing for arXiv query results.
//
// The payload must be well-formed XML. A truncated or garbled document is
// rejected as a whole: no entry from it reaches the pipeline, so nothing
// half-read is ever recorded as seen.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{error, info, warn};
use roxmltree::{Document, Node};

use crate::atoms::types::Paper;

/// Parse an arXiv Atom payload into papers, in feed order.
/// Empty or malformed input gives an empty list.
pub fn parse_feed(raw: &str) -> Vec<Paper> {
    if raw.trim().is_empty() {
        warn!("[arxiv] Empty arXiv payload received; skipping parse");
        return Vec::new();
    }

    let document = match Document::parse(raw) {
        Ok(doc) => doc,
        Err(e) => {
            error!("[arxiv] Malformed arXiv feed: {}", e);
            return Vec::new();
        }
    };

    let mut papers = Vec::new();
    for entry in document.root_element().children().filter(|n| is_named(n, "entry")) {
        let Some(id) = child_text(entry, "id").filter(|s| !s.is_empty()) else {
            warn!("[arxiv] Skipping entry without <id>");
            continue;
        };
        let title = child_text(entry, "title").unwrap_or_default();
        let summary = child_text(entry, "summary").unwrap_or_default();
        let updated = child_text(entry, "updated").and_then(|s| normalize_timestamp(&s));

        let links: Vec<Node> = children_named(entry, "link").collect();
        let link = links
            .iter()
            .find(|l| l.attribute("rel") == Some("alternate"))
            .or_else(|| links.first())
            .and_then(|l| l.attribute("href"))
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());

        papers.push(Paper { id, title, summary, link, updated });
    }

    info!("[arxiv] Parsed {} arXiv entries", papers.len());
    papers
}

/// Element whose name, ignoring namespace, is `name`.
fn is_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is_named(n, name))
}

/// Whitespace-collapsed text of the first child element named `tag`.
fn child_text(entry: Node, tag: &str) -> Option<String> {
    let el = children_named(entry, tag).next()?;
    let text: String = el.descendants().filter(|n| n.is_text()).filter_map(|n| n.text()).collect();
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Normalise a feed timestamp to UTC. Offsets are converted; a timestamp
/// without one is taken to be UTC already.
pub fn normalize_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dcat%3Ahep-ex" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=cat:hep-ex</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2025-03-05T00:00:00-05:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">2</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/2503.01234v1</id>
    <updated>2025-03-04T18:59:59Z</updated>
    <published>2025-03-04T18:59:59Z</published>
    <title>Search for lepton-flavour-violating tau decays
  at Belle II</title>
    <summary>  We search for tau -&gt; mu mu mu
decays using 428 fb^-1 of data.
</summary>
    <author>
      <name>Belle II Collaboration</name>
    </author>
    <link href="http://arxiv.org/abs/2503.01234v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2503.01234v1" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="hep-ex" scheme="http://arxiv.org/schemas/atom"/>
    <category term="hep-ex" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2503.00999v2</id>
    <updated>2025-03-04T10:00:00+02:00</updated>
    <title>Cosmology review</title>
    <summary>An overview of dark energy.</summary>
    <link title="pdf" href="http://arxiv.org/pdf/2503.00999v2" rel="related" type="application/pdf"/>
    <category term="astro-ph.CO" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>
"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let papers = parse_feed(SAMPLE);
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.id, "http://arxiv.org/abs/2503.01234v1");
        assert_eq!(first.title, "Search for lepton-flavour-violating tau decays at Belle II");
        assert_eq!(first.summary, "We search for tau -> mu mu mu decays using 428 fb^-1 of data.");
        assert_eq!(first.link, "http://arxiv.org/abs/2503.01234v1");
        assert_eq!(first.updated, Some(Utc.with_ymd_and_hms(2025, 3, 4, 18, 59, 59).unwrap()));

        let second = &papers[1];
        assert_eq!(second.title, "Cosmology review");
        // No alternate link: first link wins.
        assert_eq!(second.link, "http://arxiv.org/pdf/2503.00999v2");
        // +02:00 converted to UTC.
        assert_eq!(second.updated, Some(Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap()));
    }

    #[test]
    fn empty_or_garbage_payload_yields_nothing() {
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("   \n").is_empty());
        assert!(parse_feed("this is not a feed <<<>>>").is_empty());
        assert!(parse_feed("{\"error\": \"rate limited\"}").is_empty());
    }

    #[test]
    fn truncated_feed_yields_nothing() {
        let cut = SAMPLE.find("<title>Cosmology").unwrap() + "<title>Cosmo".len();
        assert!(parse_feed(&SAMPLE[..cut]).is_empty());

        let raw = "<feed xmlns=\"http://www.w3.org/2005/Atom\"><entry><id>a1</id><title>Tau LFV at Belle II</title>\
                   <summary>full</summary></entry><entry><id>a2</id><title>Trigger upgr";
        assert!(parse_feed(raw).is_empty());
    }

    #[test]
    fn mismatched_tags_yield_nothing() {
        let raw = "<feed><entry><id>b1</id><title>Tau decays</title><summary><b>unclosed bold</summary></entry></feed>";
        assert!(parse_feed(raw).is_empty());
    }

    #[test]
    fn author_names_are_not_titles() {
        let raw = "<feed><entry><id>c1</id><author><title>Dr</title></author><title>Real title</title></entry></feed>";
        assert_eq!(parse_feed(raw)[0].title, "Real title");
    }

    #[test]
    fn entry_without_id_is_skipped() {
        let raw = "<feed><entry><title>No id</title></entry><entry><id>x1</id><title>Ok</title></entry></feed>";
        let papers = parse_feed(raw);
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id, "x1");
        assert_eq!(papers[0].link, "x1");
        assert_eq!(papers[0].updated, None);
    }

    #[test]
    fn timestamps_normalise_to_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(normalize_timestamp("2025-01-02T03:04:05Z"), Some(expected));
        assert_eq!(normalize_timestamp("2025-01-02T03:04:05"), Some(expected));
        assert_eq!(normalize_timestamp("2025-01-02 03:04:05"), Some(expected));
        assert_eq!(normalize_timestamp("2025-01-01T22:04:05-05:00"), Some(expected));
        assert_eq!(normalize_timestamp("2025-01-02T04:04:05+0100"), Some(expected));
        assert_eq!(
            normalize_timestamp("2025-01-02"),
            Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(normalize_timestamp("yesterday"), None);
        assert_eq!(normalize_timestamp(""), None);
    }
}
