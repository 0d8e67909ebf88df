//! Shared testing utilities: an in-memory, call-counting `CitationSource`.

use async_trait::async_trait;
use pubgraph_common::{PubgraphError, Result};
use pubgraph_eutils::{ArticleRecord, CitationSource, LinkSet, CITATION_LINK_NAME};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory stand-in for E-utilities.
///
/// Unknown PMIDs behave like the real service: no link-set from
/// `link_related`, `NotFound` from `fetch_metadata`.
#[derive(Debug, Default)]
pub struct MockSource {
    link_sets: HashMap<String, LinkSet>,
    records: HashMap<String, ArticleRecord>,
    reverse_metadata: bool,
    metadata_failure: Option<String>,
    latency: Option<Duration>,
    link_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fetched_ids: std::sync::Mutex<Vec<Vec<String>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pubmed_pubmed` neighbors for `pmid`, plus a titled record for
    /// each neighbor.
    pub fn with_neighbors<S: AsRef<str>>(mut self, pmid: &str, neighbors: &[(S, u32)]) -> Self {
        for (id, _) in neighbors {
            let id = id.as_ref();
            self.records.entry(id.to_string()).or_insert_with(|| record(id));
        }
        self.link_sets.insert(
            pmid.to_string(),
            LinkSet {
                link_name: CITATION_LINK_NAME.to_string(),
                links: neighbors.iter().map(|(id, _)| id.as_ref().to_string()).collect(),
                scores: neighbors.iter().map(|(_, s)| *s).collect(),
            },
        );
        self
    }

    /// Register a raw link-set, e.g. a malformed one.
    pub fn with_link_set(mut self, pmid: &str, link_set: LinkSet) -> Self {
        self.link_sets.insert(pmid.to_string(), link_set);
        self
    }

    pub fn with_record(mut self, record: ArticleRecord) -> Self {
        self.records.insert(record.pmid.clone(), record);
        self
    }

    /// Return bulk metadata in reverse request order.
    pub fn reversing_metadata(mut self) -> Self {
        self.reverse_metadata = true;
        self
    }

    /// Fail every `fetch_metadata` call with an XML error, as a garbled
    /// efetch response would.
    pub fn failing_metadata(mut self, message: &str) -> Self {
        self.metadata_failure = Some(message.to_string());
        self
    }

    /// Delay every call, to let concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn link_calls(&self) -> usize {
        self.link_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// The id lists passed to each `fetch_metadata` call, in call order.
    pub fn fetched_ids(&self) -> Vec<Vec<String>> {
        self.fetched_ids.lock().map(|g| g.clone()).unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CitationSource for MockSource {
    async fn link_related(&self, pmid: &str) -> Result<Option<LinkSet>> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.link_sets.get(pmid).cloned())
    }

    async fn fetch_metadata(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.fetched_ids.lock() {
            seen.push(pmids.to_vec());
        }
        self.simulate_latency().await;
        if let Some(message) = &self.metadata_failure {
            return Err(PubgraphError::Xml(message.clone()));
        }

        let mut out = pmids
            .iter()
            .map(|id| {
                self.records
                    .get(id)
                    .cloned()
                    .ok_or_else(|| PubgraphError::NotFound(id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        if self.reverse_metadata {
            out.reverse();
        }
        Ok(out)
    }
}

/// A record with deterministic title, abstract and date derived from the PMID.
pub fn record(pmid: &str) -> ArticleRecord {
    ArticleRecord {
        pmid: pmid.to_string(),
        title: Some(format!("Title {pmid}")),
        abstract_text: Some(format!("Abstract {pmid}")),
        pub_date: Some("2007 Feb".to_string()),
        references: vec![],
    }
}

/// `count` neighbors named `<base + i>` scored `1..=count`, in ascending order.
pub fn ascending_neighbors(base: u32, count: u32) -> Vec<(String, u32)> {
    (1..=count).map(|i| ((base + i).to_string(), i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls_and_reports_not_found() {
        let source = MockSource::new().with_neighbors("1", &[("2", 5)]);
        assert!(source.link_related("1").await.unwrap().is_some());
        assert!(source.link_related("9").await.unwrap().is_none());
        assert!(matches!(
            source.fetch_metadata(&["9".to_string()]).await,
            Err(PubgraphError::NotFound(_))
        ));
        assert_eq!(source.link_calls(), 2);
        assert_eq!(source.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_metadata_failure() {
        let source = MockSource::new().with_record(record("1")).failing_metadata("truncated");
        assert!(matches!(
            source.fetch_metadata(&["1".to_string()]).await,
            Err(PubgraphError::Xml(ref m)) if m == "truncated"
        ));
    }
}
