//! FixtureSource reading captured responses from a temporary directory.

use pretty_assertions::assert_eq;
use pubgraph_common::PubgraphError;
use pubgraph_eutils::{CitationSource, FixtureSource};
use std::fs;
use tempfile::TempDir;

fn article(pmid: &str, title: &str) -> String {
    format!(
        "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>{pmid}</PMID>\
         <Article><ArticleTitle>{title}</ArticleTitle></Article>\
         </MedlineCitation></PubmedArticle></PubmedArticleSet>"
    )
}

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("elink")).unwrap();
    fs::create_dir_all(dir.path().join("efetch")).unwrap();
    fs::write(
        dir.path().join("elink/100.json"),
        r#"{"linksets":[{"linksetdbs":[{"linkname":"pubmed_pubmed","links":[{"id":"200","score":"10"},{"id":"300","score":"5"}]}]}]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("efetch/200.xml"), article("200", "Second")).unwrap();
    fs::write(dir.path().join("efetch/300.xml"), article("300", "Third")).unwrap();
    dir
}

#[tokio::test]
async fn test_link_related_reads_elink_fixture() {
    let dir = fixture_dir();
    let source = FixtureSource::new(dir.path());

    let set = source.link_related("100").await.unwrap().unwrap();
    assert_eq!(set.links, vec!["200".to_string(), "300".to_string()]);
    assert_eq!(set.scores, vec![10, 5]);
}

#[tokio::test]
async fn test_missing_elink_fixture_means_no_related() {
    let dir = fixture_dir();
    let source = FixtureSource::new(dir.path());
    assert!(source.link_related("0").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_metadata_keeps_request_order() {
    let dir = fixture_dir();
    let source = FixtureSource::new(dir.path());

    let records = source
        .fetch_metadata(&["300".to_string(), "200".to_string()])
        .await
        .unwrap();
    let titles: Vec<_> = records.iter().map(|r| r.title.clone().unwrap()).collect();
    assert_eq!(titles, vec!["Third".to_string(), "Second".to_string()]);
}

#[tokio::test]
async fn test_fetch_metadata_unknown_pmid_is_not_found() {
    let dir = fixture_dir();
    let source = FixtureSource::new(dir.path());

    let err = source.fetch_metadata(&["0".to_string()]).await.unwrap_err();
    assert!(matches!(err, PubgraphError::NotFound(ref p) if p == "0"));
}
