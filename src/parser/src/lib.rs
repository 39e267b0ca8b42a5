use std::path::PathBuf;

use clap::Parser;

mod error;
pub use error::ParserError;

/// Keys of the historical `KEY=VALUE` option surface.
const OPTION_KEYS: [char; 10] = ['W', 'N', 'M', 'X', 'T', 'O', 'Q', 'S', 'Z', 'I'];

/// epcr-rs: Electronic PCR
///
/// Locate every position of a nucleotide sequence where an STS primer pair
/// would plausibly prime a PCR amplification.
#[derive(Parser, Debug)]
#[clap(name="epcr-rs", author, version, about, long_about = None)]
pub struct Cli {
    /// Input STS file.
    ///
    /// Tab-delimited, one STS per line: id<TAB>primer1<TAB>primer2<TAB>size.{n}
    /// `size` is a positive integer, a range `lo-hi`, or `-`/`0` for
    /// "unknown" (the default size is substituted). `#` comments and blank
    /// lines are ignored; fields beyond the fourth are carried into the
    /// output verbatim.
    pub sts_file: PathBuf,

    /// Input sequence file (FASTA, one or more records).
    pub seq_file: PathBuf,

    /// Word size (also accepted as `W=##`).
    ///
    /// Length of the primer-tail word hashed into the catalog index. Each
    /// added base quadruples the size of the bucket table.
    #[clap(short='W', long, default_value("11"), parse(try_from_str=parse_word_size))]
    pub word_size: u32,

    /// Number of mismatches allowed per primer (also `N=##`).
    #[clap(short='N', long, default_value("0"), parse(try_from_str=parse_mismatches))]
    pub mismatches: u32,

    /// Margin on the amplicon size (also `M=##`).
    ///
    /// A hit is reported whenever the observed amplicon length deviates
    /// from the declared PCR size by at most this many bases.
    #[clap(short='M', long, default_value("50"), parse(try_from_str=parse_margin))]
    pub margin: usize,

    /// Number of 3' bases which must match exactly, on both primers (also `X=##`).
    #[clap(short='X', long, default_value("1"))]
    pub three_prime: usize,

    /// Number of worker threads (also `T=##`).
    #[clap(short='T', long, default_value("1"), parse(try_from_str=parse_threads))]
    pub threads: usize,

    /// Output file name, or `stdout` (also `O=file`).
    #[clap(short='O', long, default_value("stdout"))]
    pub output: String,

    /// Quiet flag: 0 = verbose progress messages, 1 = no progress messages
    /// (also `Q=#`).
    #[clap(short='Q', long, default_value("1"), parse(try_from_str=parse_quiet))]
    pub quiet: u8,

    /// Maximum line length for the STS file, line terminators excluded
    /// (also `S=##`).
    #[clap(short='S', long, default_value("1022"))]
    pub max_sts_line: usize,

    /// Default PCR size, substituted when the STS file leaves it unknown
    /// (also `Z=##`).
    #[clap(short='Z', long, default_value("240"), parse(try_from_str=parse_default_pcr_size))]
    pub default_pcr_size: usize,

    /// IUPAC flag: 1 = honor IUPAC ambiguity symbols in STSs (also `I=#`).
    #[clap(short='I', long, default_value("0"), parse(try_from_str=parse_iupac))]
    pub iupac: u8,
}

impl Cli {
    pub fn iupac_mode(&self) -> bool {
        self.iupac == 1
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet == 1
    }

    /// The output sink; `None` stands for stdout.
    pub fn output_path(&self) -> Option<&str> {
        (!self.output.eq_ignore_ascii_case("stdout")).then_some(self.output.as_str())
    }
}

/// Rewrite the historical `KEY=VALUE` option tokens (`W=11`, `O=out.txt`)
/// into their flag equivalents, so clap owns parsing, defaults and usage
/// output. Everything else passes through untouched.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .flat_map(|arg| {
            let mut chars = arg.chars();
            match (chars.next(), chars.next()) {
                (Some(key), Some('=')) if OPTION_KEYS.contains(&key) => {
                    vec![format!("-{key}"), arg[2..].to_string()]
                }
                _ => vec![arg],
            }
        })
        .collect()
}

fn ranged(arg: &'static str, value: &str, min: u64, max: u64) -> Result<u64, ParserError> {
    let value: u64 = value
        .parse()
        .map_err(|_| ParserError::ParseInt(arg, value.to_string()))?;
    if value < min || value > max {
        return Err(ParserError::OutOfRange { arg, min, max });
    }
    Ok(value)
}

fn parse_word_size(value: &str) -> Result<u32, ParserError> {
    Ok(ranged("W", value, 3, 16)? as u32)
}

fn parse_mismatches(value: &str) -> Result<u32, ParserError> {
    Ok(ranged("N", value, 0, 10)? as u32)
}

fn parse_margin(value: &str) -> Result<usize, ParserError> {
    Ok(ranged("M", value, 0, 10_000)? as usize)
}

fn parse_threads(value: &str) -> Result<usize, ParserError> {
    match value.parse().map_err(|_| ParserError::ParseInt("T", value.to_string()))? {
        0 => Err(ParserError::TooSmall("T", 1)),
        threads => Ok(threads),
    }
}

fn parse_quiet(value: &str) -> Result<u8, ParserError> {
    Ok(ranged("Q", value, 0, 1)? as u8)
}

fn parse_iupac(value: &str) -> Result<u8, ParserError> {
    Ok(ranged("I", value, 0, 1)? as u8)
}

fn parse_default_pcr_size(value: &str) -> Result<usize, ParserError> {
    Ok(ranged("Z", value, 1, 10_000)? as usize)
}
