use std::{path::PathBuf, time::Duration};

use clap::Parser;
use url::Url;

use crate::domain::{
    filter::{Category, FilterSet, Location},
    interval::parse_interval,
};

const DEFAULT_ARCHIVE: &str = "nfcu_jobs.txt";

/// Send Discord webhooks for new and removed NFCU job postings.
#[derive(Parser, Debug)]
#[command(name = "jobwatch", version)]
pub struct Cli {
    /// Discord webhook URL to post notifications to.
    #[arg(long, value_name = "DISCORD_WEBHOOK", value_parser = parse_webhook)]
    pub webhook: Url,

    /// Job categories to monitor. Searches all categories when omitted.
    #[arg(long, value_name = "CATEGORY", num_args = 1..)]
    pub categories: Vec<Category>,

    /// Job locations to monitor. Searches all locations when omitted.
    #[arg(long, value_name = "LOCATION", num_args = 1..)]
    pub locations: Vec<Location>,

    /// Keep checking for jobs every --interval.
    #[arg(long)]
    pub continuous: bool,

    /// Wait between checks in days, hours, minutes and seconds (e.g. 1d2h30m).
    #[arg(
        long,
        value_name = "0d0h0m0s",
        value_parser = parse_interval,
        default_value = "6h"
    )]
    pub interval: Duration,

    /// File storing the jobs seen by the previous check.
    #[arg(
        long,
        value_name = "FILE",
        value_parser = validate_archive,
        default_value = DEFAULT_ARCHIVE
    )]
    pub archive: PathBuf,

    /// Send notifications on the first run instead of silently filling the archive.
    #[arg(long)]
    pub force_old: bool,
}

impl Cli {
    pub fn filters(&self) -> FilterSet {
        FilterSet::new(self.categories.clone(), self.locations.clone())
    }
}

fn parse_webhook(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid webhook URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("unsupported webhook scheme '{}'", scheme)),
    }
}

/// The archive may not exist yet, but the directory it goes in must.
fn validate_archive(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.is_dir() {
        return Err(format!(
            "invalid path: directory {} does not exist",
            dir.display()
        ));
    }

    Ok(path)
}
