use clap::Parser;
use std::path::PathBuf;
use stock_predictor::cache::HistoryCache;
use stock_predictor::dashboard::update_graph;
use stock_predictor::pipeline::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stock-predictor")]
#[command(about = "LSTM stock price predictor", long_about = None)]
struct Cli {
    /// Ticker code or free-text query for the asset
    query: String,

    /// Days to forecast beyond the observed data
    #[arg(long, default_value_t = 30)]
    horizon: usize,

    /// Consecutive prior observations fed to the model per prediction
    #[arg(long, default_value_t = 15)]
    lookback: usize,

    /// Training epochs
    #[arg(long, default_value_t = 20)]
    epochs: usize,

    /// Directory for the two figure JSON payloads
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        lookback: cli.lookback,
        epochs: cli.epochs,
        horizon: cli.horizon,
        ..PipelineConfig::default()
    };

    let cache = HistoryCache::new();
    let view = update_graph(&cli.query, &config, &cache).await;

    std::fs::create_dir_all(&cli.out)?;
    std::fs::write(
        cli.out.join("training_plot.json"),
        serde_json::to_string_pretty(&view.training_plot)?,
    )?;
    std::fs::write(
        cli.out.join("future_plot.json"),
        serde_json::to_string_pretty(&view.future_plot)?,
    )?;

    println!("{}", view.info_text);
    println!("{}", view.score_text);

    Ok(())
}
