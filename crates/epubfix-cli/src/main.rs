use epubfix_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse_or_exit();

    if cli.log_file {
        if let Err(e) = logging::init_logging() {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable ({:#}), logging to stderr", e);
        }
    } else {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run() {
        eprintln!("epubfix error: {:#}", err);
        std::process::exit(1);
    }
}
