//! Platform statistics command handler

use crate::config::Config;
use crate::db::Storage;
use crate::services::RatingAggregator;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let storage = Storage::connect(&config.general).await?;
    let aggregator = RatingAggregator::new(storage, config.ratings.clone());

    let stats = aggregator.platform_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
