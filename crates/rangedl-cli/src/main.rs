use rangedl_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        eprintln!("rangedl: {:#}", err);
    }

    if let Err(err) = Cli::run_from_args().await {
        eprintln!("rangedl error: {:#}", err);
        std::process::exit(1);
    }
}
