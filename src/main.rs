//! Demo driver that stands in for the external orchestrator: runs the
//! collect-then-predict sequence once and prints both tool payloads.
//!
//! Usage: `cargo run -- "Nikkei 225 news" N225`

use index_sentiment_predictor::{fetch_stock_news_from_google_news, predict_index, AppConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "Dow Jones news".to_string());
    let target_index = args.next().unwrap_or_else(|| "DOW".to_string());

    let cfg = AppConfig::load_default();

    let fetched = fetch_stock_news_from_google_news(&cfg, &query).await;
    println!("{}", serde_json::to_string_pretty(&fetched)?);

    let predicted = predict_index(&cfg, &target_index).await;
    println!("{}", serde_json::to_string_pretty(&predicted)?);

    Ok(())
}
