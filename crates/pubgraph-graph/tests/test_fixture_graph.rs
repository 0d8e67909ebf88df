//! End-to-end graph export from captured E-utilities responses.

use pretty_assertions::assert_eq;
use pubgraph_eutils::FixtureSource;
use pubgraph_graph::Citation;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn article_xml(pmid: &str, title: &str, abstract_text: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">{pmid}</PMID>
      <Article>
        <Journal><JournalIssue><PubDate><Year>2007</Year><Month>Feb</Month></PubDate></JournalIssue></Journal>
        <ArticleTitle>{title}</ArticleTitle>
        <Abstract><AbstractText>{abstract_text}</AbstractText></Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#
    )
}

fn write_fixtures() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("elink")).unwrap();
    fs::create_dir_all(root.join("efetch")).unwrap();

    fs::write(
        root.join("elink/17284678.json"),
        r#"{"header":{"type":"elink"},"linksets":[{"dbfrom":"pubmed","ids":["17284678"],"linksetdbs":[
            {"dbto":"pubmed","linkname":"pubmed_pubmed","links":[
                {"id":"17284678","score":"100000"},
                {"id":"2231712","score":"400"},
                {"id":"2983426","score":"100"}
            ]}]}]}"#,
    )
    .unwrap();
    fs::write(
        root.join("efetch/17284678.xml"),
        article_xml("17284678", "Root title", "Root abstract"),
    )
    .unwrap();
    fs::write(root.join("efetch/2231712.xml"), article_xml("2231712", "BLAST", "Alignment")).unwrap();
    fs::write(root.join("efetch/2983426.xml"), article_xml("2983426", "FASTA", "Search")).unwrap();
    dir
}

#[tokio::test]
async fn test_graph_from_fixtures() {
    let dir = write_fixtures();
    let source = FixtureSource::new(dir.path());
    let mut c = Citation::new("17284678").unwrap();

    let v: Value = serde_json::from_str(&c.to_json(&source).await.unwrap()).unwrap();

    assert_eq!(
        v,
        json!({
            "nodes": [
                {"PMID": "17284678", "abstract": "Root abstract", "title": "Root title"},
                {"PMID": "17284678"},
                {"PMID": "2231712"},
                {"PMID": "2983426"}
            ],
            "links": [
                {"source": 0, "target": 1, "value": 1.0},
                {"source": 0, "target": 2, "value": 0.004},
                {"source": 0, "target": 3, "value": 0.001}
            ]
        })
    );

    let related = c.related_citations(&source).await.unwrap();
    assert_eq!(related[0].title(), Some("Root title"));
    assert_eq!(related[1].title(), Some("BLAST"));
    assert_eq!(related[2].pub_date(), Some("2007 Feb"));
}

#[tokio::test]
async fn test_unknown_root_from_fixtures() {
    let dir = write_fixtures();
    let source = FixtureSource::new(dir.path());
    let mut c = Citation::new("0").unwrap();

    c.get_info(&source).await;
    assert_eq!(c.pmid(), None);
    assert!(c.related_citations(&source).await.unwrap().is_empty());
}
