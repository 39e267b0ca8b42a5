use std::process;

use clap::Parser;

#[macro_use]
extern crate log;

/// Parse command line arguments and run `sts_match::run()`
fn main() {
    // ----------------------------- Run CLI Parser
    let args = parser::normalize_args(std::env::args());
    let cli = match parser::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let exit_code = match e.kind() {
                clap::ErrorKind::DisplayHelp | clap::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(exit_code);
        }
    };

    // ----------------------------- Init logger.
    logger::Logger::init(cli.is_quiet());

    // ----------------------------- Run the search.
    match sts_match::run(&cli) {
        Ok(()) => (),
        Err(e) => {
            error!("{e:?}");
            process::exit(1);
        }
    };
}
