use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tempfile::TempDir;

/// Builder for end-to-end epcr-rs runs over throwaway fixture files.
///
/// Writes the given STS and FASTA texts into a temporary directory, then
/// assembles the command line the way a user would type it (legacy
/// `KEY=VALUE` tokens included).
#[derive(Default)]
pub struct EpcrRunnerBuilder {
    sts: String,
    fasta: String,
    options: Vec<String>,
}

impl EpcrRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sts(mut self, text: &str) -> Self {
        self.sts = text.to_string();
        self
    }

    pub fn fasta(mut self, text: &str) -> Self {
        self.fasta = text.to_string();
        self
    }

    /// Append one raw command-line token, e.g. `"W=4"` or `"T=8"`.
    pub fn option(mut self, token: &str) -> Self {
        self.options.push(token.to_string());
        self
    }

    pub fn build(self) -> Result<EpcrRunner> {
        let dir = tempfile::tempdir().context("fixture directory should be creatable")?;
        let sts_path = dir.path().join("markers.sts");
        let fasta_path = dir.path().join("sequence.fa");
        let output = dir.path().join("hits.tsv");
        std::fs::write(&sts_path, &self.sts)?;
        std::fs::write(&fasta_path, &self.fasta)?;

        let mut args = vec![
            "epcr-rs".to_string(),
            sts_path.display().to_string(),
            fasta_path.display().to_string(),
            format!("O={}", output.display()),
        ];
        args.extend(self.options);

        let cli = parser::Cli::try_parse_from(parser::normalize_args(args))
            .context("fixture arguments should parse")?;
        Ok(EpcrRunner { _dir: dir, cli, output })
    }
}

pub struct EpcrRunner {
    _dir: TempDir,
    cli: parser::Cli,
    output: PathBuf,
}

impl EpcrRunner {
    /// Run the full pipeline and collect the emitted rows.
    pub fn run(&self) -> Result<Vec<String>> {
        sts_match::run(&self.cli)?;
        let written = std::fs::read_to_string(&self.output)?;
        Ok(written.lines().map(ToString::to_string).collect())
    }
}
