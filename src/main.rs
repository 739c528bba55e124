use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tg_upload::{finish, init_logging, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from `.env` file into std::env (optional)
    dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    init_logging();
    let result = run(cli).await;
    finish(&result)
}
