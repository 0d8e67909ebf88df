//! The `Citation` entity.

use pubgraph_common::{PubgraphError, Result};
use pubgraph_eutils::{ArticleRecord, CitationSource, LinkSet, CITATION_LINK_NAME};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::export::CitationGraph;
use crate::normalise::max_normalise;
use crate::pmid::Pmid;

/// One publication and, lazily, its one-hop neighborhood.
///
/// Related citations are discovered at most once per instance. Later reads
/// return the same cached `Vec`, so score updates made by [`Citation::normalize`]
/// are visible through every subsequent [`Citation::related_citations`] call.
/// The cache is a [`OnceCell`], so concurrent callers share one in-flight fetch.
#[derive(Debug)]
pub struct Citation {
    pmid: Option<Pmid>,
    score: Option<u32>,
    normalized_score: f64,
    title: Option<String>,
    abstract_text: Option<String>,
    pub_date: Option<String>,
    references: Option<Vec<String>>,
    info_fetched: bool,
    related: OnceCell<Vec<Citation>>,
}

impl Citation {
    /// Root citation from a raw identifier. Whitespace is trimmed; the
    /// remainder must be decimal digits.
    pub fn new(raw: &str) -> Result<Self> {
        Ok(Self::from_pmid(Pmid::parse(raw)?, 0))
    }

    /// Root citation from an identifier carried in JSON. Non-strings fail
    /// with [`PubgraphError::RequiresString`].
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::from_pmid(Pmid::from_value(value)?, 0))
    }

    fn from_pmid(pmid: Pmid, score: u32) -> Self {
        Self {
            pmid: Some(pmid),
            score: Some(score),
            normalized_score: 0.0,
            title: None,
            abstract_text: None,
            pub_date: None,
            references: None,
            info_fetched: false,
            related: OnceCell::new(),
        }
    }

    pub fn pmid(&self) -> Option<&str> {
        self.pmid.as_ref().map(Pmid::as_str)
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn normalized_score(&self) -> f64 {
        self.normalized_score
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn pub_date(&self) -> Option<&str> {
        self.pub_date.as_deref()
    }

    /// PMIDs this citation cites. Only set by [`Citation::get_info`].
    pub fn references(&self) -> Option<&[String]> {
        self.references.as_deref()
    }

    /// Fetch this citation's own metadata.
    ///
    /// A failed lookup is not an error, whether the PMID is unknown or the
    /// source itself failed: the citation moves to the all-absent state (no
    /// PMID, no score, no metadata) and the caller checks [`Citation::pmid`]
    /// afterwards.
    #[instrument(skip(self, source), fields(pmid = ?self.pmid()))]
    pub async fn get_info(&mut self, source: &dyn CitationSource) {
        let Some(pmid) = self.pmid.clone() else {
            return;
        };
        self.info_fetched = true;

        match source.fetch_metadata(&[pmid.to_string()]).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => self.apply_own_record(record),
                None => {
                    warn!(%pmid, "Metadata lookup returned no record");
                    self.clear();
                }
            },
            Err(e) if e.is_not_found() => {
                debug!(%pmid, "PMID not in catalog; clearing citation");
                self.clear();
            }
            Err(e) => {
                warn!(%pmid, error = %e, "Metadata lookup failed; clearing citation");
                self.clear();
            }
        }
    }

    fn apply_own_record(&mut self, record: ArticleRecord) {
        self.title = record.title;
        self.abstract_text = record.abstract_text;
        self.pub_date = record.pub_date;
        self.references = Some(record.references);
    }

    /// Transition to the all-absent state used for unknown identifiers.
    fn clear(&mut self) {
        self.pmid = None;
        self.score = None;
        self.title = None;
        self.abstract_text = None;
        self.pub_date = None;
        self.references = None;
    }

    /// Related citations, fetched on first call and cached for the lifetime
    /// of this instance.
    ///
    /// A failed discovery leaves the cache empty so a later call retries.
    pub async fn related_citations(&self, source: &dyn CitationSource) -> Result<&[Citation]> {
        let neighbors = self
            .related
            .get_or_try_init(|| self.discover_related(source))
            .await?;
        Ok(neighbors)
    }

    #[instrument(skip(self, source), fields(pmid = ?self.pmid()))]
    async fn discover_related(&self, source: &dyn CitationSource) -> Result<Vec<Citation>> {
        let Some(pmid) = self.pmid.as_ref() else {
            return Ok(vec![]);
        };

        let Some(link_set) = source.link_related(pmid.as_str()).await? else {
            debug!("No link-set for PMID");
            return Ok(vec![]);
        };

        let mut neighbors = neighbors_from_link_set(link_set)?;
        if neighbors.is_empty() {
            return Ok(neighbors);
        }

        // One bulk round trip for every neighbor.
        let ids: Vec<String> = neighbors.iter().filter_map(|n| n.pmid().map(str::to_string)).collect();
        let records = source.fetch_metadata(&ids).await?;
        if records.len() != neighbors.len() {
            return Err(PubgraphError::UpstreamContract(format!(
                "requested metadata for {} related PMIDs, got {} records",
                neighbors.len(),
                records.len()
            )));
        }

        for (neighbor, record) in neighbors.iter_mut().zip(records) {
            if neighbor.pmid() != Some(record.pmid.as_str()) {
                return Err(PubgraphError::UpstreamContract(format!(
                    "metadata out of request order: expected PMID {:?}, got {}",
                    neighbor.pmid(),
                    record.pmid
                )));
            }
            neighbor.title = record.title;
            neighbor.abstract_text = record.abstract_text;
            neighbor.pub_date = record.pub_date;
        }

        debug!(count = neighbors.len(), "Related citations hydrated");
        Ok(neighbors)
    }

    /// Rescale every neighbor's score by the neighborhood maximum, in place.
    /// Returns the same cached neighbors [`Citation::related_citations`] does.
    pub async fn normalize(&mut self, source: &dyn CitationSource) -> Result<&[Citation]> {
        self.related_citations(source).await?;
        let Some(neighbors) = self.related.get_mut() else {
            return Ok(&[]);
        };

        let scores: Vec<u32> = neighbors.iter().map(|n| n.score.unwrap_or(0)).collect();
        for (neighbor, normalized) in neighbors.iter_mut().zip(max_normalise(&scores)) {
            neighbor.normalized_score = normalized;
        }
        Ok(neighbors.as_slice())
    }

    /// Discover, normalise and make sure this citation's own metadata has been
    /// looked up once, then assemble the exportable graph.
    pub async fn graph(&mut self, source: &dyn CitationSource) -> Result<CitationGraph> {
        self.related_citations(source).await?;
        self.normalize(source).await?;
        if self.abstract_text.is_none() && !self.info_fetched {
            self.get_info(source).await;
        }

        let neighbors = self.related.get().map(Vec::as_slice).unwrap_or(&[]);
        Ok(CitationGraph::build(self, neighbors))
    }

    /// The graph as compact JSON text.
    pub async fn to_json(&mut self, source: &dyn CitationSource) -> Result<String> {
        Ok(self.graph(source).await?.to_json()?)
    }
}

/// One neighbor per related PMID, in link-set order, scored from the link-set.
fn neighbors_from_link_set(link_set: LinkSet) -> Result<Vec<Citation>> {
    if link_set.link_name != CITATION_LINK_NAME {
        return Err(PubgraphError::UpstreamContract(format!(
            "expected link name {}, got {}",
            CITATION_LINK_NAME, link_set.link_name
        )));
    }
    if link_set.links.len() != link_set.scores.len() {
        return Err(PubgraphError::UpstreamContract(format!(
            "{} related PMIDs but {} scores",
            link_set.links.len(),
            link_set.scores.len()
        )));
    }

    link_set
        .links
        .iter()
        .zip(link_set.scores)
        .map(|(id, score)| {
            let pmid = Pmid::parse(id).map_err(|_| {
                PubgraphError::UpstreamContract(format!("related id {:?} is not a PMID", id))
            })?;
            Ok(Citation::from_pmid(pmid, score))
        })
        .collect()
}
