// FlowC Engine: Keyword Engine
// Derives relevance keywords for the arXiv filter from a sample of fetched
// papers. The static base list is the floor: it is returned whenever there
// is nothing to sample or the model gives back nothing usable.

use log::{info, warn};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::atoms::constants::{BASE_KEYWORDS, KEYWORD_SAMPLE_PAPERS, KEYWORD_SUMMARY_PREFIX_CHARS};
use crate::atoms::types::{truncate_chars, AskOptions, CompletionRequest, Paper};
use crate::gateway::AiGateway;

const DOMAIN_PROFILE: &str = "\
You are assisting an experimental high-energy physicist working on:
- Belle II
- tau LFV searches
- trigger & flavor physics
- form factors
- TDCPV";

pub struct KeywordEngine {
    base: Vec<String>,
}

impl Default for KeywordEngine {
    fn default() -> Self {
        Self::new(BASE_KEYWORDS.iter().map(|s| s.to_string()).collect())
    }
}

impl KeywordEngine {
    /// An empty `base` falls back to the built-in list.
    pub fn new(base: Vec<String>) -> Self {
        let base: Vec<String> = normalize(base);
        if base.is_empty() {
            return Self::default();
        }
        KeywordEngine { base }
    }

    pub fn base_keywords(&self) -> &[String] {
        &self.base
    }

    /// Propose keywords for `recent`. No papers → base list, no network call.
    pub async fn generate(&self, gateway: &AiGateway, recent: &[Paper], ttl: Duration) -> Vec<String> {
        if recent.is_empty() {
            info!("[keywords] No recent papers; using base keywords only");
            return self.base.clone();
        }

        let prompt = Self::build_prompt(recent);
        info!("[keywords] Generating filter keywords from {} papers", recent.len().min(KEYWORD_SAMPLE_PAPERS));

        let out = gateway.ask(&CompletionRequest::new(prompt), &AskOptions::cached(ttl)).await;
        let keywords = parse_keywords(&out);
        if keywords.is_empty() {
            warn!("[keywords] Model returned no usable keywords; using base keywords");
            return self.base.clone();
        }

        info!("[keywords] Generated {} keywords: {:?}", keywords.len(), keywords);
        keywords
    }

    pub(crate) fn build_prompt(recent: &[Paper]) -> String {
        let sample: Vec<String> = recent
            .iter()
            .take(KEYWORD_SAMPLE_PAPERS)
            .map(|p| format!("- {}: {}", p.title, truncate_chars(&p.summary, KEYWORD_SUMMARY_PREFIX_CHARS)))
            .collect();

        format!(
            "{DOMAIN_PROFILE}\n\n\
             Given the following recent arXiv papers (titles and partial summaries),\n\
             suggest 5-10 keywords that would best filter future relevant papers.\n\n\
             Return ONLY a comma-separated list of lowercase keywords.\n\n\
             Papers:\n{}\n",
            sample.join("\n")
        )
    }
}

/// Split a comma-separated model answer into trimmed, lowercased keywords.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    normalize(raw.split(',').map(str::to_string).collect())
}

fn normalize(words: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

// ── Keyword set ────────────────────────────────────────────────────────────

/// Base keywords unioned with the per-run dynamic ones. Never empty as long
/// as the base list isn't.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    base: BTreeSet<String>,
    all: BTreeSet<String>,
}

impl KeywordSet {
    pub fn new(base: &[String], dynamic: &[String]) -> Self {
        let base: BTreeSet<String> = normalize(base.to_vec()).into_iter().collect();
        let mut all = base.clone();
        all.extend(normalize(dynamic.to_vec()));
        KeywordSet { base, all }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Any keyword (base or dynamic) is a substring of `lowered`.
    pub fn any_in(&self, lowered: &str) -> bool {
        self.all.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// Any base keyword is a substring of `lowered`.
    pub fn any_base_in(&self, lowered: &str) -> bool {
        self.base.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.all.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AnyProvider;
    use crate::testing::ScriptedProvider;

    fn paper(title: &str, summary: &str) -> Paper {
        Paper {
            id: format!("http://arxiv.org/abs/{}", title.len()),
            title: title.into(),
            summary: summary.into(),
            link: String::new(),
            updated: None,
        }
    }

    fn gateway(provider: ScriptedProvider) -> AiGateway {
        AiGateway::new(AnyProvider::new(provider), None)
    }

    #[tokio::test]
    async fn empty_sample_returns_base_without_network() {
        let provider = ScriptedProvider::always_failing();
        let calls = provider.calls();
        let engine = KeywordEngine::default();
        let out = engine.generate(&gateway(provider), &[], Duration::from_secs(60)).await;
        assert_eq!(out, engine.base_keywords());
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn parses_comma_separated_answer() {
        let provider = ScriptedProvider::new(vec![Ok(" Muon g-2, LEPTON universality ,, b-physics\n".into())]);
        let engine = KeywordEngine::default();
        let out = engine
            .generate(&gateway(provider), &[paper("B decays", "abstract")], Duration::from_secs(60))
            .await;
        assert_eq!(out, vec!["muon g-2", "lepton universality", "b-physics"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_sentinel_yields_base() {
        let engine = KeywordEngine::default();
        let out = engine
            .generate(&gateway(ScriptedProvider::always_failing()), &[paper("x", "y")], Duration::from_secs(60))
            .await;
        assert_eq!(out, engine.base_keywords());
    }

    #[test]
    fn prompt_samples_at_most_eight_papers_and_truncates() {
        let long = "a".repeat(500);
        let papers: Vec<Paper> = (0..12).map(|i| paper(&format!("Title {}", i), &long)).collect();
        let prompt = KeywordEngine::build_prompt(&papers);
        assert!(prompt.contains("Title 7"));
        assert!(!prompt.contains("Title 8"));
        assert!(prompt.contains(&format!(": {}\n", "a".repeat(200))));
        assert!(!prompt.contains(&"a".repeat(201)));
    }

    #[test]
    fn keyword_set_union_is_normalized() {
        let base = vec!["Tau".to_string(), "belle ii".to_string()];
        let dynamic = vec![" tau ".to_string(), "CP violation".to_string(), "".to_string()];
        let set = KeywordSet::new(&base, &dynamic);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["belle ii", "cp violation", "tau"]);
        assert!(set.any_in("search for cp violation in b decays"));
        assert!(!set.any_base_in("search for cp violation in b decays"));
        assert!(set.any_base_in("tau lfv at belle ii"));
    }

    #[test]
    fn empty_base_falls_back_to_builtin() {
        let engine = KeywordEngine::new(vec!["  ".into()]);
        assert_eq!(engine.base_keywords().len(), BASE_KEYWORDS.len());
    }
}
