use std::time::Duration;

use anyhow::Context;

use crate::{
    cli::Cli,
    configuration::Settings,
    dal::ArchiveStore,
    domain::interval::format_interval,
    services::{CareersClient, DiscordNotifier, JobWatcher, ListingSource, Notifier},
};

/// Wires the careers client, webhook and archive together and checks for jobs
/// once, or forever in continuous mode. The archive stays locked until return.
pub async fn run(cli: Cli, configuration: Settings) -> anyhow::Result<()> {
    let archive = ArchiveStore::new(&cli.archive);
    let _lock = archive.lock().context("Failed to lock archive.")?;

    let careers_client =
        CareersClient::new(&configuration.careers).context("Failed to build HTTP client.")?;
    let notifier = DiscordNotifier::new(
        careers_client.http_client().clone(),
        cli.webhook.clone(),
        configuration.webhook,
        careers_client.listings_url().to_string(),
    );

    let filters = cli.filters();
    log::info!(
        "Watching {} categories in {} locations, archive {}",
        filters.categories().len(),
        filters.locations().len(),
        archive.path().display()
    );

    let watcher = JobWatcher::new(careers_client, notifier, archive, filters.combinations())
        .max_pages(configuration.careers.max_pages)
        .notify_first_run(cli.force_old);

    let interval = cli.continuous.then_some(cli.interval);
    schedule(&watcher, interval).await
}

/// Runs `watcher` once when `interval` is `None`, otherwise sleeps `interval`
/// between checks until one fails.
pub async fn schedule<S, N>(
    watcher: &JobWatcher<S, N>,
    interval: Option<Duration>,
) -> anyhow::Result<()>
where
    S: ListingSource + Sync,
    N: Notifier + Sync,
{
    loop {
        watcher.check_once().await.context("Job check failed.")?;

        let Some(interval) = interval else {
            return Ok(());
        };

        log::info!("Sleeping for {}.", format_interval(interval));
        tokio::time::sleep(interval).await;
    }
}
