//! `search` command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use contracts::{HeroSearch, SearchConfig, SearchResults};
use ::search::{PipelineStats, SearchPipeline};

use crate::cli::SearchArgs;

/// Feed stdin lines through the search pipeline and print every delivered
/// result set.
pub async fn run_search<S>(
    searcher: Arc<S>,
    mut config: SearchConfig,
    args: &SearchArgs,
) -> Result<PipelineStats>
where
    S: HeroSearch + Send + Sync + 'static,
{
    if let Some(debounce_ms) = args.debounce_ms {
        config = config.with_debounce(Duration::from_millis(debounce_ms.max(1)));
    }
    if let Some(supersede) = args.supersede {
        config = config.with_supersede(supersede.into());
    }

    info!(
        debounce_ms = config.debounce_ms,
        supersede = ?config.supersede,
        "Reading search terms from stdin"
    );

    let (input, mut output, task) = SearchPipeline::spawn(searcher, config).into_parts();

    let printer = tokio::spawn(async move {
        while let Some(results) = output.recv().await {
            print_results(&results);
        }
    });

    let pace = Duration::from_millis(args.pace_ms);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read search terms from stdin")?
    {
        if !input.search(line) {
            break;
        }
        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }
    input.close();

    let stats = task.await.context("Search pipeline task failed")?;
    printer.await.context("Result printer task failed")?;

    if args.stats {
        stats.print_summary();
    }
    Ok(stats)
}

fn print_results(results: &SearchResults) {
    println!("\"{}\" ({})", results.term, results.heroes.len());
    for hero in &results.heroes {
        println!("   {hero}");
    }
}
