//! Data models returned by citation sources.

use serde::{Deserialize, Serialize};

/// Link name E-utilities uses for PubMed-to-PubMed "similar articles" relations.
pub const CITATION_LINK_NAME: &str = "pubmed_pubmed";

/// Related records for one PMID as reported by elink.
///
/// `links` and `scores` are kept as parallel lists, exactly as they come off
/// the wire, so that consumers can check they line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    pub link_name: String,
    pub links: Vec<String>,
    pub scores: Vec<u32>,
}

/// One article's metadata as returned by efetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub pmid: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub pub_date: Option<String>,
    /// PMIDs of the works this article cites.
    pub references: Vec<String>,
}

impl ArticleRecord {
    pub fn new(pmid: impl Into<String>) -> Self {
        Self { pmid: pmid.into(), ..Default::default() }
    }
}
