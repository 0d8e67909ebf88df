//! pubgraph-eutils — Client side of the NCBI E-utilities service.
//! - elink: related PMIDs with relevance scores
//! - efetch: titles, abstracts, publication dates and reference lists
//! - on-disk fixtures with the same parsers, for offline runs and tests

pub mod models;
pub mod sources;

pub use models::{ArticleRecord, LinkSet, CITATION_LINK_NAME};
pub use sources::{CitationSource, EutilsClient, EutilsConfig, FixtureSource};
