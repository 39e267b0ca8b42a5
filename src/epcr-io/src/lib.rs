//! File ingest and output plumbing for epcr-rs.

pub mod read;
pub mod write;
