//! pubgraph-graph — One-hop citation graph around a PMID.
//!
//! `Citation` validates its identifier, lazily discovers and caches related
//! citations through a [`CitationSource`], rescales their scores and exports
//! a `{"nodes": [...], "links": [...]}` document for visualisation.

pub mod citation;
pub mod export;
pub mod normalise;
pub mod pmid;

pub use citation::Citation;
pub use export::{CitationGraph, Link, NeighborNode, Node, QueryNode};
pub use pmid::Pmid;
pub use pubgraph_eutils::CitationSource;
