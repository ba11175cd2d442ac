use std::env::{args_os, var};

use jira_reporter::{command, normalize_args, run};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    if var("RUST_LOG").is_ok() {
        env_logger::init();
    }
    let matches = command().get_matches_from(normalize_args(args_os()));
    run(&matches).await
}
