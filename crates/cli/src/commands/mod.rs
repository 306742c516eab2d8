//! Command implementations.

mod heroes;
mod search;
mod validate;

pub use validate::run_validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use config_loader::{ConfigLoader, HeroesConfig};
use contracts::{HeroTransport, SharedMessageSink};
use gateway::{FanoutSink, GatewayFailure, HeroGateway, MessageLog, TracingMessageSink};
use transport::{HttpHeroTransport, InMemoryHeroTransport};

use crate::cli::{Cli, HeroCommand};
use crate::error::CliError;

/// Load configuration, apply CLI overrides and re-validate
pub fn load_config(cli: &Cli) -> crate::error::Result<HeroesConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)?
        }
        None => HeroesConfig::default(),
    };

    if let Some(ref base_url) = cli.base_url {
        info!(base_url = %base_url, "Overriding base URL from CLI");
        config.transport.base_url = base_url.clone();
    }

    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// Execute a gateway command and print the message log afterwards
pub async fn run_hero_command(cli: &Cli, command: &HeroCommand) -> Result<()> {
    let config = load_config(cli).context("Failed to load configuration")?;

    let log = Arc::new(MessageLog::new());
    let sink: SharedMessageSink = Arc::new(
        FanoutSink::new(Vec::new())
            .with(log.clone())
            .with(Arc::new(TracingMessageSink::new("messages"))),
    );

    let result = if cli.in_memory {
        info!("Using seeded in-memory hero collection");
        let gateway =
            HeroGateway::with_config(InMemoryHeroTransport::new(), sink, config.gateway.clone());
        execute(gateway, command, &config).await
    } else {
        let transport = HttpHeroTransport::new(&config.transport).map_err(CliError::from)?;
        info!(url = %transport.collection_url(), "Using HTTP hero collection");
        let gateway = HeroGateway::with_config(transport, sink, config.gateway.clone());
        execute(gateway, command, &config).await
    };

    print_messages(&log);
    result
}

async fn execute<T>(gateway: HeroGateway<T>, command: &HeroCommand, config: &HeroesConfig) -> Result<()>
where
    T: HeroTransport + Send + Sync + 'static,
{
    let gateway = Arc::new(gateway);
    let mut failures = gateway.subscribe_failures();

    match command {
        HeroCommand::List => heroes::list(&gateway).await,
        HeroCommand::Get(args) => heroes::get(&gateway, args.id).await,
        HeroCommand::Add(args) => heroes::add(&gateway, &args.name).await,
        HeroCommand::Update(args) => heroes::update(&gateway, args.id, &args.name).await,
        HeroCommand::Delete(args) => heroes::delete(&gateway, args.id).await,
        HeroCommand::Search(args) => {
            search::run_search(Arc::clone(&gateway), config.search.clone(), args).await?;
        }
    }

    let (absorbed, missed): (Vec<GatewayFailure>, u64) = drain_failures(&mut failures);

    match (command, absorbed.first()) {
        (_, None) if missed == 0 => Ok(()),
        // A failed search already showed up as an empty result set
        (HeroCommand::Search(_), _) => {
            warn!(failures = absorbed.len() as u64 + missed, "Some searches failed");
            Ok(())
        }
        (_, Some(failure)) => Err(CliError::operation_failed(failure).into()),
        (_, None) => anyhow::bail!("{missed} gateway operations failed"),
    }
}

/// Take every buffered failure. Returns the failures still held by the
/// channel and the number lost to lagging.
fn drain_failures<T: Clone>(failures: &mut broadcast::Receiver<T>) -> (Vec<T>, u64) {
    let mut absorbed = Vec::new();
    let mut missed = 0;
    loop {
        match failures.try_recv() {
            Ok(failure) => absorbed.push(failure),
            Err(TryRecvError::Lagged(skipped)) => missed += skipped,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    (absorbed, missed)
}

fn print_messages(log: &MessageLog) {
    if log.is_empty() {
        return;
    }
    println!("\nMessages");
    for message in log.messages() {
        println!("   {message}");
    }
}
