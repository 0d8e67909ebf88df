//! Citation source backed by captured E-utilities responses on disk.
//!
//! Layout:
//!   <root>/elink/<pmid>.json   elink neighbor_score response
//!   <root>/efetch/<pmid>.xml   efetch abstract-mode response for that PMID

use async_trait::async_trait;
use pubgraph_common::{PubgraphError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::models::{ArticleRecord, LinkSet};
use super::pubmed::{parse_elink_json, parse_pubmed_xml};
use super::{align_to_request, CitationSource};

#[derive(Debug, Clone)]
pub struct FixtureSource {
    root: PathBuf,
}

impl FixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn elink_path(&self, pmid: &str) -> PathBuf {
        self.root.join("elink").join(format!("{pmid}.json"))
    }

    fn efetch_path(&self, pmid: &str) -> PathBuf {
        self.root.join("efetch").join(format!("{pmid}.xml"))
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CitationSource for FixtureSource {
    #[instrument(skip(self))]
    async fn link_related(&self, pmid: &str) -> Result<Option<LinkSet>> {
        match read_optional(&self.elink_path(pmid)).await? {
            Some(body) => parse_elink_json(&body),
            None => {
                debug!("No elink fixture; treating as no related records");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    async fn fetch_metadata(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        let mut records = Vec::with_capacity(pmids.len());
        for pmid in pmids {
            let xml = read_optional(&self.efetch_path(pmid))
                .await?
                .ok_or_else(|| PubgraphError::NotFound(pmid.clone()))?;
            records.extend(parse_pubmed_xml(&xml)?);
        }
        align_to_request(pmids, records)
    }
}
