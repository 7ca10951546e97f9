//! codeward CLI entry point.

use clap::Parser;
use codeward::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let exit_code = cli::run(cli).await;

    std::process::exit(exit_code);
}
