// FlowC Engine: INSPIRE Hot-Paper Bootstrap
//
// Seeds the hot-paper pool with landmark experimental papers. Three
// collaboration query groups are paged through in order (most cited first)
// until the unused count reaches the target. Abstracts are rewritten into a
// short digest summary through the gateway; the raw abstract is kept when
// the model is unavailable.

pub mod client;

pub use client::InspireClient;

use log::{info, warn};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::atoms::constants::{
    HOT_POOL_DEFAULT_TARGET, INSPIRE_ID_PREFIX, INSPIRE_PAGE_SIZE, INSPIRE_SORT, INSPIRE_SUMMARY_MODEL,
    INSPIRE_SUMMARY_TTL,
};
use crate::atoms::error::EngineResult;
use crate::atoms::traits::LiteratureSource;
use crate::atoms::types::{AskOptions, CompletionRequest};
use crate::gateway::AiGateway;
use crate::store::Store;

/// One usable hit from a literature page.
#[derive(Debug, Clone, PartialEq)]
pub struct InspireHit {
    pub title: String,
    pub abstract_text: String,
    pub year: Option<i32>,
    pub arxiv: Option<String>,
}

/// A named INSPIRE query paged through up to `pages` pages.
#[derive(Debug, Clone)]
pub struct QueryGroup {
    pub name: &'static str,
    pub query: String,
    pub pages: u32,
}

/// Collider, neutrino and flavour groups, in the order they are seeded.
pub fn default_groups() -> Vec<QueryGroup> {
    vec![
        QueryGroup {
            name: "collider",
            query: "(collaboration:ATLAS OR collaboration:CMS OR collaboration:CDF OR collaboration:D0 \
                    OR collaboration:LHCb) AND year:1970->2025"
                .into(),
            pages: 5,
        },
        QueryGroup {
            name: "neutrino",
            query: "(collaboration:\"Super-Kamiokande\" OR collaboration:Kamiokande OR collaboration:T2K \
                    OR collaboration:MINOS OR collaboration:NOvA OR collaboration:K2K OR collaboration:IceCube) \
                    AND year:1960->2025"
                .into(),
            pages: 4,
        },
        QueryGroup {
            name: "flavour",
            query: "(collaboration:Belle OR collaboration:\"Belle II\" OR collaboration:BaBar) AND year:1980->2025"
                .into(),
            pages: 4,
        },
    ]
}

/// Pull title, abstract, year and arXiv id out of a literature page.
/// Hits without a title are skipped.
pub fn extract_hits(data: &Value) -> Vec<InspireHit> {
    let Some(hits) = data["hits"]["hits"].as_array() else {
        return Vec::new();
    };

    hits.iter()
        .filter_map(|hit| {
            let md = &hit["metadata"];
            let title = md["titles"][0]["title"].as_str().map(str::trim).unwrap_or_default();
            if title.is_empty() {
                return None;
            }
            let abstract_text = md["abstracts"][0]["value"].as_str().map(str::trim).unwrap_or_default();
            let arxiv = md["arxiv_eprints"][0]["value"]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            Some(InspireHit {
                title: title.to_string(),
                abstract_text: abstract_text.to_string(),
                year: parse_year(&md["earliest_date"]),
                arxiv,
            })
        })
        .collect()
}

fn parse_year(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    raw.get(..4)?.parse().ok()
}

/// Persistent pool id: the arXiv id when known, otherwise a short hash of
/// title and year.
pub fn make_id(title: &str, arxiv: Option<&str>, year: Option<i32>) -> String {
    if let Some(arxiv) = arxiv.map(str::trim).filter(|s| !s.is_empty()) {
        return arxiv.to_string();
    }
    let base = format!("{}::{}", title.trim(), year.map(|y| y.to_string()).unwrap_or_default());
    let digest = Sha256::digest(base.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", INSPIRE_ID_PREFIX, &hex[..12])
}

fn summary_prompt(abstract_text: &str) -> String {
    format!(
        "Rewrite the following physics paper abstract into a short, clean summary\n\
         for a daily digest. Keep it factual, concise, and accurate.\n\n\
         Abstract:\n{abstract_text}\n\n\
         Return only the rewritten summary."
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootstrapReport {
    pub pages_fetched: usize,
    pub added: usize,
    pub unused: usize,
}

pub struct InspireBootstrap {
    source: Box<dyn LiteratureSource>,
    page_size: u32,
}

impl InspireBootstrap {
    pub fn new(source: Box<dyn LiteratureSource>) -> Self {
        InspireBootstrap { source, page_size: INSPIRE_PAGE_SIZE }
    }

    /// Digest summary for one abstract. Empty abstracts stay empty.
    async fn summarize(&self, gateway: &AiGateway, abstract_text: &str) -> String {
        if abstract_text.is_empty() {
            return String::new();
        }
        let request = CompletionRequest::new(summary_prompt(abstract_text)).with_model(INSPIRE_SUMMARY_MODEL);
        let options = AskOptions::cached(INSPIRE_SUMMARY_TTL).with_fallback(abstract_text);
        let out = gateway.ask(&request, &options).await;
        if out.trim().is_empty() {
            abstract_text.to_string()
        } else {
            out.trim().to_string()
        }
    }

    /// Page through `query` until `pages` pages are read or the pool holds
    /// `target` unused entries. Missing pages are skipped.
    pub async fn fetch_and_fill(
        &self,
        gateway: &AiGateway,
        store: &Store,
        query: &str,
        pages: u32,
        target: usize,
        report: &mut BootstrapReport,
    ) -> EngineResult<()> {
        info!("[inspire] Query: {}", query);

        for page in 1..=pages {
            if store.hot_pool_remaining()? >= target {
                info!("[inspire] Target of {} reached; stopping", target);
                return Ok(());
            }

            info!("[inspire] Fetching page {}/{}", page, pages);
            let Some(data) = self.source.fetch_page(query, self.page_size, page, Some(INSPIRE_SORT)).await else {
                warn!("[inspire] No data for page {}", page);
                continue;
            };
            report.pages_fetched += 1;

            let hits = extract_hits(&data);
            info!("[inspire] Extracted {} papers", hits.len());

            for hit in hits {
                let summary = self.summarize(gateway, &hit.abstract_text).await;
                let id = make_id(&hit.title, hit.arxiv.as_deref(), hit.year);
                if store.add_hot_paper(&id, &hit.title, &summary, hit.year, hit.arxiv.as_deref())? {
                    report.added += 1;
                }
            }

            info!("[inspire] Pool now has {} unused papers", store.hot_pool_remaining()?);
        }
        Ok(())
    }

    /// Seed the pool from the default query groups up to `target` unused
    /// entries. Later groups only run while the pool is below target.
    pub async fn bootstrap_default(
        &self,
        gateway: &AiGateway,
        store: &Store,
        target: Option<usize>,
    ) -> EngineResult<BootstrapReport> {
        let target = target.unwrap_or(HOT_POOL_DEFAULT_TARGET);
        info!("[inspire] Bootstrap to target={}", target);

        let mut report = BootstrapReport::default();
        for group in default_groups() {
            if store.hot_pool_remaining()? >= target {
                break;
            }
            info!("[inspire] Seeding group {}", group.name);
            self.fetch_and_fill(gateway, store, &group.query, group.pages, target, &mut report)
                .await?;
        }

        report.unused = store.hot_pool_remaining()?;
        info!(
            "[inspire] Bootstrap complete: {} added from {} pages, {} unused",
            report.added, report.pages_fetched, report.unused
        );
        Ok(report)
    }
}
