use clap::Parser;

use melted_trail::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli::run(cli).await {
        eprintln!("{}", cli::output::render_cli_error(&e));
        std::process::exit(1);
    }
}
