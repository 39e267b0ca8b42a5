//! Core engine of epcr-rs: build the STS catalog once, then scan each
//! FASTA record across parallel shards and report every plausible
//! amplification site.

pub mod alphabet;
pub mod catalog;
pub mod report;
pub mod scan;
pub mod shard;

use std::fs::File;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::info;

use epcr_io::read::read_fasta;
use epcr_io::write::GenericWriter;

use catalog::{CatalogSettings, StsCatalog};
use report::HitReporter;
use scan::ScanParams;

impl From<&parser::Cli> for CatalogSettings {
    fn from(cli: &parser::Cli) -> Self {
        Self {
            word_size: cli.word_size,
            margin: cli.margin,
            default_pcr_size: cli.default_pcr_size,
            max_line_len: cli.max_sts_line,
            iupac_mode: cli.iupac_mode(),
        }
    }
}

/// Main runner.
pub fn run(cli: &parser::Cli) -> Result<()> {
    // ----------------------------- Build the STS catalog.
    info!("Reading STS file...");
    let sts_file = File::open(&cli.sts_file)
        .with_context(|| format!("unable to open STS file '{}'", cli.sts_file.display()))?;
    let (catalog, sts_file) = StsCatalog::read(sts_file, &CatalogSettings::from(cli))
        .with_context(|| format!("while parsing STS file '{}'", cli.sts_file.display()))?;
    info!(
        "{} STS records in catalog (max pcr size: {})",
        catalog.len(),
        catalog.max_pcr_size
    );

    // ----------------------------- Validate the output sink before scanning.
    let writer = GenericWriter::new(cli.output_path()).context("while opening the output sink")?;

    // ----------------------------- Load the sequence file.
    info!("Reading sequence file...");
    let records = read_fasta(&cli.seq_file)?;

    // ----------------------------- Scan each record, then report its hits.
    let params = ScanParams::new(
        cli.word_size,
        cli.mismatches,
        cli.margin,
        cli.three_prime,
        cli.iupac_mode(),
    );
    let mut reporter = HitReporter::new(sts_file, writer, cli.max_sts_line);

    let progress = match log::log_enabled!(log::Level::Info) {
        true => logger::Logger::attach(ProgressBar::new(records.len() as u64)),
        false => ProgressBar::hidden(),
    };
    for record in &records {
        info!("Processing sequence '{}' ({} bp)", record.label, record.seq.len());
        let hits = shard::scan_record(&record.seq, &catalog, &params, cli.threads)?;
        reporter.report_record(&record.label, &hits, &catalog)?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    // ----------------------------- Summarize.
    match reporter.total_hits() {
        0 => info!("NO HITS"),
        1 => info!("1 hit found"),
        n => info!("{n} hits found"),
    }
    Ok(())
}
