use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use jobwatch::{cli::Cli, configuration::get_configuration, startup::run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;

    run(cli, configuration).await
}
