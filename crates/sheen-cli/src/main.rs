#![forbid(unsafe_code)]

//! `sheen` binary entry point.

use std::io::{self, Write};

use sheen_cli::{cli, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = cli::Opts::parse();

    let filter = EnvFilter::try_from_env("SHEEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let result = run(
        &opts,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    if let Err(e) = result {
        let _ = io::stdout().flush();
        let code = e.exit_code();
        if code != 0 {
            eprintln!("sheen: {e}");
        }
        std::process::exit(code);
    }
}
