// Copyright © 2016, Peter Atashian
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use wikiedit::{compose, Error, Mediawiki};

/// Overwrite a wiki page with formatted text.
#[derive(Parser)]
#[command(name = "formatter-saver", version)]
struct Args {
    /// Format string; backslash escapes are decoded and `{}` receives the file contents
    #[arg(allow_hyphen_values = true)]
    format_string: String,
    /// Title of the page to overwrite
    #[arg(allow_hyphen_values = true)]
    title: String,
    /// Edit summary
    #[arg(allow_hyphen_values = true)]
    summary: String,
    /// File whose contents are substituted into the format string
    #[arg(allow_hyphen_values = true)]
    filename: Option<PathBuf>,
    /// Wiki client configuration
    #[arg(long, env = "WIKIEDIT_CONFIG", default_value = "wiki.json")]
    config: PathBuf,
}

fn save(args: &Args) -> Result<(), Error> {
    let source = args.filename.as_deref().map(compose::read_source).transpose()?;
    let text = compose::compose_text(&args.format_string, source.as_deref())?;
    let mw = Mediawiki::login_path(&args.config)?;
    compose::save_text(&mw, &args.title, text, &args.summary)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = save(&args) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}
