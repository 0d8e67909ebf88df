//! PubMed E-utilities client.
//!
//! Endpoints used:
//!   elink:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/elink.fcgi  (cmd=neighbor_score)
//!   efetch: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi (rettype=abstract, XML)

use async_trait::async_trait;
use pubgraph_common::sandbox::SandboxClient as Client;
use pubgraph_common::{PubgraphError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::models::{ArticleRecord, LinkSet, CITATION_LINK_NAME};
use super::{align_to_request, CitationSource};

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EutilsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_tool")]
    pub tool: String,
    pub email: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url()     -> String { DEFAULT_BASE_URL.to_string() }
fn default_tool()         -> String { "pubgraph".to_string() }
fn default_timeout_secs() -> u64    { 30 }

impl Default for EutilsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            tool: default_tool(),
            email: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub struct EutilsClient {
    client: Client,
    config: EutilsConfig,
}

impl EutilsClient {
    pub fn new(config: EutilsConfig) -> Result<Self> {
        let mut client = Client::with_timeout(Duration::from_secs(config.timeout_secs))?;

        // A configured base URL (e.g. a local mirror) is trusted explicitly.
        let base = url::Url::parse(&config.base_url)
            .map_err(|e| PubgraphError::Config(format!("Invalid eutils.base_url {}: {}", config.base_url, e)))?;
        if let Some(host) = base.host_str() {
            client.allow_domain(host);
        }

        Ok(Self { client, config })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}.fcgi", self.config.base_url.trim_end_matches('/'), name)
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.config.tool.clone())];
        if let Some(email) = &self.config.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}

#[async_trait]
impl CitationSource for EutilsClient {
    #[instrument(skip(self))]
    async fn link_related(&self, pmid: &str) -> Result<Option<LinkSet>> {
        let mut params = self.base_params();
        params.push(("dbfrom", "pubmed".to_string()));
        params.push(("db", "pubmed".to_string()));
        params.push(("cmd", "neighbor_score".to_string()));
        params.push(("retmode", "json".to_string()));
        params.push(("id", pmid.to_string()));

        let body = self.client
            .get(&self.endpoint("elink"))?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let link_set = parse_elink_json(&body)?;
        debug!(
            related = link_set.as_ref().map(|l| l.links.len()).unwrap_or(0),
            "elink returned related PMIDs"
        );
        Ok(link_set)
    }

    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    async fn fetch_metadata(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        if pmids.is_empty() {
            return Ok(vec![]);
        }

        let mut params = self.base_params();
        params.push(("db", "pubmed".to_string()));
        params.push(("id", pmids.join(",")));
        params.push(("rettype", "abstract".to_string()));
        params.push(("retmode", "xml".to_string()));

        let xml = self.client
            .get(&self.endpoint("efetch"))?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let records = parse_pubmed_xml(&xml)?;
        debug!(requested = pmids.len(), parsed = records.len(), "efetch returned articles");
        align_to_request(pmids, records)
    }
}

// ---------------------------------------------------------------------------
// elink (JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ElinkResponse {
    #[serde(default)]
    linksets: Vec<RawLinkSet>,
}

#[derive(Debug, Deserialize)]
struct RawLinkSet {
    #[serde(default)]
    linksetdbs: Vec<RawLinkSetDb>,
}

#[derive(Debug, Deserialize)]
struct RawLinkSetDb {
    linkname: String,
    #[serde(default)]
    links: Vec<RawLink>,
}

/// neighbor_score links are `{"id": .., "score": ..}`; plain neighbor links are bare ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLink {
    Scored { id: StrOrNum, score: StrOrNum },
    Bare(StrOrNum),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Num(u64),
    Str(String),
}

impl StrOrNum {
    fn into_string(self) -> String {
        match self {
            StrOrNum::Num(n) => n.to_string(),
            StrOrNum::Str(s) => s,
        }
    }
}

/// Parse an elink `retmode=json` response into the first link-set.
/// Prefers the `pubmed_pubmed` db; any other name is passed through untouched
/// so the caller can reject it.
pub fn parse_elink_json(body: &str) -> Result<Option<LinkSet>> {
    let resp: ElinkResponse = serde_json::from_str(body)?;

    let Some(first) = resp.linksets.into_iter().next() else {
        return Ok(None);
    };

    let mut dbs = first.linksetdbs;
    if dbs.is_empty() {
        return Ok(None);
    }
    let pick = dbs
        .iter()
        .position(|db| db.linkname == CITATION_LINK_NAME)
        .unwrap_or(0);
    let db = dbs.swap_remove(pick);
    if db.links.is_empty() {
        return Ok(None);
    }

    let mut links = Vec::with_capacity(db.links.len());
    let mut scores = Vec::with_capacity(db.links.len());
    for link in db.links {
        match link {
            RawLink::Scored { id, score } => {
                links.push(id.into_string());
                let raw = score.into_string();
                let score = raw.trim().parse::<u32>().map_err(|_| {
                    PubgraphError::UpstreamContract(format!("elink score {:?} is not an integer", raw))
                })?;
                scores.push(score);
            }
            RawLink::Bare(id) => links.push(id.into_string()),
        }
    }

    Ok(Some(LinkSet { link_name: db.linkname, links, scores }))
}

// ---------------------------------------------------------------------------
// efetch (XML)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ArticleDraft {
    pmid: Option<String>,
    title: String,
    abstract_sections: Vec<String>,
    date_parts: Vec<String>,
    medline_date: Option<String>,
    references: Vec<String>,
    id_type: Option<String>,
    in_cites: bool,
}

impl ArticleDraft {
    fn on_text(&mut self, path: &[String], text: &str) {
        let last = path.last().map(String::as_str).unwrap_or("");
        let parent = if path.len() >= 2 { path[path.len() - 2].as_str() } else { "" };
        let within = |name: &str| path.iter().any(|p| p == name);

        match (parent, last) {
            ("MedlineCitation", "PMID") => {
                if self.pmid.is_none() {
                    self.pmid = Some(text.trim().to_string());
                }
            }
            ("CommentsCorrections", "PMID") if self.in_cites => self.add_reference(text),
            ("PubDate", "Year" | "Season" | "Month" | "Day") => {
                self.date_parts.push(text.trim().to_string());
            }
            ("PubDate", "MedlineDate") => self.medline_date = Some(text.trim().to_string()),
            (_, "ArticleId") if within("Reference") => {
                if self.id_type.as_deref() == Some("pubmed") {
                    self.add_reference(text);
                }
            }
            _ if within("ArticleTitle") => self.title.push_str(text),
            _ if within("AbstractText") => {
                if let Some(section) = self.abstract_sections.last_mut() {
                    section.push_str(text);
                }
            }
            _ => {}
        }
    }

    fn add_reference(&mut self, text: &str) {
        let id = text.trim();
        if !id.is_empty() && !self.references.iter().any(|r| r == id) {
            self.references.push(id.to_string());
        }
    }

    fn finish(self) -> Option<ArticleRecord> {
        let pmid = self.pmid?;
        let title = non_empty(self.title.trim());
        let sections: Vec<&str> = self.abstract_sections
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let abstract_text = if sections.is_empty() { None } else { Some(sections.join(" ")) };
        let pub_date = self.medline_date
            .or_else(|| non_empty(&self.date_parts.join(" ")));

        Some(ArticleRecord { pmid, title, abstract_text, pub_date, references: self.references })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Parse PubMed XML (efetch abstract mode) into one record per `<PubmedArticle>`.
/// Articles without a PMID are skipped; NCBI `<ERROR>` payloads yield no records.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<ArticleRecord>> {
    let mut records = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<ArticleDraft> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "PubmedArticle" {
                    current = Some(ArticleDraft::default());
                }
                if let Some(ref mut draft) = current {
                    match name.as_str() {
                        "AbstractText" => draft.abstract_sections.push(String::new()),
                        "ArticleId" => draft.id_type = attr_value(e, b"IdType"),
                        "CommentsCorrections" => {
                            draft.in_cites = attr_value(e, b"RefType").as_deref() == Some("Cites");
                        }
                        _ => {}
                    }
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut draft) = current {
                    let text = e.unescape().map_err(|err| PubgraphError::Xml(err.to_string()))?;
                    draft.on_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("PubmedArticle") {
                    if let Some(record) = current.take().and_then(ArticleDraft::finish) {
                        records.push(record);
                    } else {
                        warn!("Skipping PubmedArticle without a PMID");
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PubgraphError::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}
