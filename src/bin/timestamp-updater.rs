// Copyright © 2016, Peter Atashian
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use wikiedit::timestamp::{update_timestamp, DumpDate};
use wikiedit::Mediawiki;

/// Stamp a date into the marker comment of a data page.
#[derive(Parser)]
#[command(name = "timestamp-updater", version)]
struct Args {
    /// Title of the data page
    #[arg(allow_hyphen_values = true)]
    title: String,
    /// Date of the dump, yyyy-mm-dd
    date: DumpDate,
    /// Edit summary
    #[arg(allow_hyphen_values = true)]
    summary: String,
    /// Wiki client configuration
    #[arg(long, env = "WIKIEDIT_CONFIG", default_value = "wiki.json")]
    config: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let result = Mediawiki::login_path(&args.config)
        .and_then(|mw| update_timestamp(&mw, &args.title, &args.date, &args.summary));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        exit(1);
    }
}
