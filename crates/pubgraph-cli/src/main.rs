//! pubgraph — one-hop citation graph for a PubMed identifier.
//! Entry point for the command-line binary.

mod config;

use anyhow::Context;
use clap::Parser;
use pubgraph_eutils::{CitationSource, EutilsClient, FixtureSource};
use pubgraph_graph::Citation;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pubgraph", version, about = "Build a one-hop PubMed citation graph as node/link JSON")]
struct Cli {
    /// PMID to build the graph around
    #[arg(required_unless_present = "batch", conflicts_with = "batch")]
    pmid: Option<String>,

    /// JSON array of PMIDs; one graph file per entry is written to --output-dir
    #[arg(long)]
    batch: Option<PathBuf>,

    /// Write the graph here instead of stdout
    #[arg(short, long, conflicts_with = "batch")]
    output: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long)]
    pretty: bool,

    /// Read captured elink/efetch responses from this directory instead of NCBI
    #[arg(long, env = "PUBGRAPH_FIXTURES")]
    fixtures: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_source(cli: &Cli, config: &config::Config) -> anyhow::Result<Box<dyn CitationSource>> {
    match &cli.fixtures {
        Some(dir) => {
            info!("Using fixture responses from {}", dir.display());
            Ok(Box::new(FixtureSource::new(dir)))
        }
        None => {
            if config.eutils.api_key.is_none() {
                warn!("No NCBI API key configured; E-utilities allows 3 requests/second without one");
            }
            Ok(Box::new(EutilsClient::new(config.eutils.clone())?))
        }
    }
}

/// Build and serialise the graph for one root citation.
async fn render(
    mut citation: Citation,
    source: &dyn CitationSource,
    pretty: bool,
) -> anyhow::Result<String> {
    let query = citation.pmid().unwrap_or_default().to_string();
    let graph = citation
        .graph(source)
        .await
        .with_context(|| format!("Failed to build citation graph for PMID {query}"))?;

    if citation.pmid().is_none() {
        warn!(pmid = %query, "PMID not found in PubMed; exporting an empty query node");
    }
    info!(pmid = %query, neighbors = graph.neighbor_count(), "Citation graph built");

    let json = if pretty { graph.to_json_pretty()? } else { graph.to_json()? };
    Ok(json)
}

async fn run_single(cli: &Cli, raw: &str, source: &dyn CitationSource) -> anyhow::Result<()> {
    let citation = Citation::new(raw)?;
    let json = render(citation, source, cli.pretty).await?;

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Graph written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Parse a batch file into root citations. Every entry must be a JSON string.
fn parse_batch(content: &str) -> anyhow::Result<Vec<Citation>> {
    let entries: Vec<Value> = serde_json::from_str(content)
        .context("Batch file must be a JSON array of PMID strings")?;
    entries
        .iter()
        .enumerate()
        .map(|(i, v)| Citation::from_value(v).with_context(|| format!("Batch entry {i}")))
        .collect()
}

async fn run_batch(
    batch: &Path,
    output_dir: &Path,
    pretty: bool,
    source: &dyn CitationSource,
) -> anyhow::Result<Vec<PathBuf>> {
    let content = tokio::fs::read_to_string(batch)
        .await
        .with_context(|| format!("Failed to read batch file {}", batch.display()))?;
    let citations = parse_batch(&content)?;
    tokio::fs::create_dir_all(output_dir).await?;

    let mut written = Vec::with_capacity(citations.len());
    for citation in citations {
        let name = citation.pmid().unwrap_or_default().to_string();
        let json = render(citation, source, pretty).await?;
        let path = output_dir.join(format!("{name}.json"));
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    info!(count = written.len(), "Batch complete");
    Ok(written)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;

    // Logs go to stderr; stdout carries only graph JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("pubgraph={},warn", config.log_level))),
        )
        .init();

    let source = build_source(&cli, &config)?;

    match (&cli.batch, &cli.pmid) {
        (Some(batch), _) => {
            run_batch(batch, &cli.output_dir, cli.pretty, source.as_ref()).await?;
        }
        (None, Some(pmid)) => run_single(&cli, pmid, source.as_ref()).await?,
        (None, None) => anyhow::bail!("Provide a PMID or --batch FILE"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("efetch")).unwrap();
        fs::write(
            dir.path().join("efetch/42.xml"),
            "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>42</PMID>\
             <Article><ArticleTitle>Answer</ArticleTitle><Abstract><AbstractText>Text</AbstractText></Abstract></Article>\
             </MedlineCitation></PubmedArticle></PubmedArticleSet>",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_pmid_or_batch() {
        assert!(Cli::try_parse_from(["pubgraph"]).is_err());
        assert!(Cli::try_parse_from(["pubgraph", "17284678"]).is_ok());
        assert!(Cli::try_parse_from(["pubgraph", "--batch", "ids.json"]).is_ok());
        assert!(Cli::try_parse_from(["pubgraph", "1", "--batch", "ids.json"]).is_err());
    }

    #[test]
    fn test_parse_batch_rejects_non_string_entries() {
        let err = parse_batch(r#"["17284678", 17284678]"#).unwrap_err();
        assert!(format!("{err:#}").contains("requires a String"));
        assert!(parse_batch(r#"[" 42 "]"#).unwrap()[0].pmid() == Some("42"));
        assert!(parse_batch(r#"{"pmid": "42"}"#).is_err());
    }

    #[tokio::test]
    async fn test_run_batch_writes_one_file_per_pmid() {
        let fixtures = fixture_dir();
        let out = TempDir::new().unwrap();
        let batch = out.path().join("ids.json");
        fs::write(&batch, r#"["42", "0"]"#).unwrap();

        let source = FixtureSource::new(fixtures.path());
        let written = run_batch(&batch, &out.path().join("graphs"), false, &source).await.unwrap();
        assert_eq!(written.len(), 2);

        let found: Value = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(found["nodes"][0]["title"], "Answer");
        let missing: Value = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert!(missing["nodes"][0]["PMID"].is_null());
        assert!(written[1].ends_with("0.json"));
    }
}
