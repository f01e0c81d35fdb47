// FlowC Engine: arXiv Relevance Pipeline
//
// fetch (1 day, widened to 3 when empty) → parse → keyword generation on a
// sample → relevance filter → seen-paper dedup.
//
// Accepted papers are recorded in the seen-paper store as they are accepted,
// so a second run over the same feed yields nothing. Store errors are logged
// and the affected paper is dropped from this run.

pub mod client;
pub mod parser;

pub use client::ArxivClient;
pub use parser::{normalize_timestamp, parse_feed};

use log::{error, info};
use std::time::Duration;

use crate::atoms::constants::{
    ARXIV_FALLBACK_WINDOW_DAYS, ARXIV_KEYWORD_SAMPLE, ARXIV_PRIMARY_WINDOW_DAYS, DOMAIN_MARKERS, KEYWORD_TTL,
};
use crate::atoms::traits::FeedSource;
use crate::atoms::types::Paper;
use crate::gateway::AiGateway;
use crate::keywords::{KeywordEngine, KeywordSet};
use crate::store::Store;

pub struct ArxivPipeline {
    feed: Box<dyn FeedSource>,
    keywords: KeywordEngine,
    keyword_ttl: Duration,
}

impl ArxivPipeline {
    pub fn new(feed: Box<dyn FeedSource>) -> Self {
        ArxivPipeline { feed, keywords: KeywordEngine::default(), keyword_ttl: KEYWORD_TTL }
    }

    /// Relevant, previously unseen papers in feed order.
    pub async fn run(&self, gateway: &AiGateway, store: &Store) -> Vec<Paper> {
        let mut papers = parse_feed(&self.feed.fetch(ARXIV_PRIMARY_WINDOW_DAYS).await);
        if papers.is_empty() {
            info!(
                "[arxiv] No papers in the last {} day(s); widening to {} days",
                ARXIV_PRIMARY_WINDOW_DAYS, ARXIV_FALLBACK_WINDOW_DAYS
            );
            papers = parse_feed(&self.feed.fetch(ARXIV_FALLBACK_WINDOW_DAYS).await);
        }
        if papers.is_empty() {
            info!("[arxiv] Feed is empty; nothing to filter");
            return Vec::new();
        }

        let sample = &papers[..papers.len().min(ARXIV_KEYWORD_SAMPLE)];
        let dynamic = self.keywords.generate(gateway, sample, self.keyword_ttl).await;
        let keywords = KeywordSet::new(self.keywords.base_keywords(), &dynamic);

        let fetched = papers.len();
        let mut accepted = Vec::new();
        for paper in papers {
            if !is_relevant(&paper, &keywords) {
                continue;
            }
            match store.paper_exists(&paper.id) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    error!("[arxiv] Seen-paper lookup failed for {}: {}", paper.id, e);
                    continue;
                }
            }
            if let Err(e) = store.record_paper(&paper.id, &paper.title, &paper.summary) {
                error!("[arxiv] Failed to record {}: {}", paper.id, e);
                continue;
            }
            accepted.push(paper);
        }

        info!("[arxiv] {} of {} fetched papers accepted", accepted.len(), fetched);
        accepted
    }
}

/// Keyword hit in title or summary, a base keyword in the title, or a
/// generic domain marker in the title.
pub fn is_relevant(paper: &Paper, keywords: &KeywordSet) -> bool {
    let title = paper.title.to_lowercase();
    let summary = paper.summary.to_lowercase();
    keywords.any_in(&title)
        || keywords.any_in(&summary)
        || keywords.any_base_in(&title)
        || DOMAIN_MARKERS.iter().any(|m| title.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AnyProvider;
    use crate::testing::{atom_feed, ScriptedProvider, StaticFeed};

    fn gateway() -> AiGateway {
        let provider = ScriptedProvider::responding(|_| "lepton flavour violation, belle ii".into());
        AiGateway::new(AnyProvider::new(provider), None)
    }

    fn paper(title: &str, summary: &str) -> Paper {
        Paper { id: "p".into(), title: title.into(), summary: summary.into(), link: "p".into(), updated: None }
    }

    #[tokio::test]
    async fn keeps_relevant_and_drops_unrelated() {
        let feed = atom_feed(&[
            ("a1", "Tau LFV at Belle II", "We search for lepton flavour violation."),
            ("a2", "Cosmology review", "An overview of dark energy."),
        ]);
        let pipeline = ArxivPipeline::new(Box::new(StaticFeed::new(vec![(1, feed)])));
        let store = Store::open_in_memory().unwrap();

        let out = pipeline.run(&gateway(), &store).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a1");
        assert_eq!(out[0].title, "Tau LFV at Belle II");
        assert!(store.paper_exists("a1").unwrap());
        assert!(!store.paper_exists("a2").unwrap());
    }

    #[tokio::test]
    async fn second_run_over_same_feed_is_empty() {
        let feed = atom_feed(&[
            ("a1", "Tau LFV at Belle II", "x"),
            ("a3", "Trigger upgrades", "y"),
        ]);
        let pipeline = ArxivPipeline::new(Box::new(StaticFeed::new(vec![(1, feed)])));
        let store = Store::open_in_memory().unwrap();
        let gw = gateway();

        let first = pipeline.run(&gw, &store).await;
        assert_eq!(first.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["a1", "a3"]);
        assert!(pipeline.run(&gw, &store).await.is_empty());
    }

    #[tokio::test]
    async fn previously_seen_paper_is_skipped() {
        let feed = atom_feed(&[("a1", "Tau LFV at Belle II", "x"), ("a4", "Form factor fits", "y")]);
        let pipeline = ArxivPipeline::new(Box::new(StaticFeed::new(vec![(1, feed)])));
        let store = Store::open_in_memory().unwrap();
        store.record_paper("a1", "Tau LFV at Belle II", "older summary").unwrap();

        let out = pipeline.run(&gateway(), &store).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a4");
        assert_eq!(store.get_paper("a1").unwrap().unwrap().summary, "older summary");
    }

    #[tokio::test]
    async fn empty_day_widens_to_three_days() {
        let wide = atom_feed(&[("w1", "hep-ex highlights", "z")]);
        let source = StaticFeed::new(vec![(1, String::new()), (3, wide)]);
        let requested = source.requested();
        let pipeline = ArxivPipeline::new(Box::new(source));
        let store = Store::open_in_memory().unwrap();

        let out = pipeline.run(&gateway(), &store).await;
        assert_eq!(*requested.lock(), vec![1, 3]);
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn quiet_day_falls_back_and_keeps_only_the_tau_paper() {
        let wide = atom_feed(&[
            ("b1", "Tau LFV search at Belle II", "Upper limits on rare decays."),
            ("b2", "Cosmology review", "An overview of dark energy."),
        ]);
        let source = StaticFeed::new(vec![(1, String::new()), (3, wide)]);
        // Keyword generation unavailable: the base list alone decides.
        let gw = AiGateway::new(AnyProvider::new(ScriptedProvider::new(vec![Ok(String::from(","))])), None);
        let pipeline = ArxivPipeline::new(Box::new(source));
        let store = Store::open_in_memory().unwrap();

        let out = pipeline.run(&gw, &store).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Tau LFV search at Belle II");
    }

    #[tokio::test]
    async fn nothing_fetched_means_no_model_call() {
        let provider = ScriptedProvider::always_failing();
        let calls = provider.calls();
        let gw = AiGateway::new(AnyProvider::new(provider), None);
        let pipeline = ArxivPipeline::new(Box::new(StaticFeed::new(vec![])));
        let store = Store::open_in_memory().unwrap();

        assert!(pipeline.run(&gw, &store).await.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn truncated_feed_records_nothing() {
        let full = atom_feed(&[("a1", "Tau LFV at Belle II", "x"), ("a2", "Trigger upgrades", "y")]);
        let cut = full.find("Trigger upgrades").unwrap() + "Trigger upgr".len();
        let pipeline = ArxivPipeline::new(Box::new(StaticFeed::new(vec![(1, full[..cut].to_string())])));
        let store = Store::open_in_memory().unwrap();

        assert!(pipeline.run(&gateway(), &store).await.is_empty());
        assert!(!store.paper_exists("a1").unwrap());
        assert!(!store.paper_exists("a2").unwrap());
    }

    #[test]
    fn relevance_rules() {
        let set = KeywordSet::new(&["tau".to_string()], &["neutrino mass".to_string()]);
        assert!(is_relevant(&paper("TAU polarisation", ""), &set));
        assert!(is_relevant(&paper("Something", "bounds on the Neutrino Mass"), &set));
        assert!(is_relevant(&paper("Astrophysics of X", ""), &set));
        assert!(is_relevant(&paper("HEP software survey", ""), &set));
        assert!(!is_relevant(&paper("Cosmology review", "An overview of dark energy."), &set));
    }
}
