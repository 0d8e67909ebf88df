//! Citation source clients.

pub mod fixture;
pub mod pubmed;

pub use fixture::FixtureSource;
pub use pubmed::{EutilsClient, EutilsConfig};

use async_trait::async_trait;
use pubgraph_common::{PubgraphError, Result};
use std::collections::HashMap;

use crate::models::{ArticleRecord, LinkSet};

/// The two capabilities the citation graph consumes from a bibliographic service.
#[async_trait]
pub trait CitationSource: Send + Sync {
    /// Related PMIDs with relevance scores for one PMID.
    /// `None` when the PMID is unknown or has no related records.
    async fn link_related(&self, pmid: &str) -> Result<Option<LinkSet>>;

    /// Bulk metadata lookup. Records come back in request order;
    /// fails with `NotFound` if any requested PMID has no record.
    async fn fetch_metadata(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>>;
}

/// Reorder parsed records to match the request, failing on the first PMID
/// with no record. A PMID requested twice gets the same record twice.
pub(crate) fn align_to_request(
    requested: &[String],
    records: Vec<ArticleRecord>,
) -> Result<Vec<ArticleRecord>> {
    let mut by_pmid: HashMap<String, ArticleRecord> = records
        .into_iter()
        .map(|r| (r.pmid.clone(), r))
        .collect();

    let mut aligned = Vec::with_capacity(requested.len());
    for (i, pmid) in requested.iter().enumerate() {
        let repeated_later = requested[i + 1..].contains(pmid);
        let record = if repeated_later {
            by_pmid.get(pmid).cloned()
        } else {
            by_pmid.remove(pmid)
        };
        match record {
            Some(r) => aligned.push(r),
            None => return Err(PubgraphError::NotFound(pmid.clone())),
        }
    }
    Ok(aligned)
}
