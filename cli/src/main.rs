use std::process::ExitCode;

use clap::Parser;
use fieldwork_cli::Cli;
use fieldwork_cli::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = match logging::init(cli.log_file()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("fieldwork: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let category = fieldwork_cli::error_category(&err).unwrap_or("UNCATEGORIZED");
            tracing::error!(category, "{err:#}");
            ExitCode::FAILURE
        }
    }
}
