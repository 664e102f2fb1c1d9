//! File boundaries: CSV point ingestion and result/curve exports.

pub mod export;
pub mod ingest;
