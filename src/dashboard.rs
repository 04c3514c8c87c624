use crate::cache::HistoryCache;
use crate::data::{fetch_daily_history, resolve_symbol};
use crate::error::PredictError;
use crate::figure::{empty_figure, future_figure, train_test_figure, Figure};
use crate::pipeline::{PipelineConfig, PipelineRun};
use crate::types::PriceSeries;

pub const NO_SCORE_TEXT: &str = "No R2 Score to display";
pub const NO_ASSET_TEXT: &str = "No Asset Queried or Selected";

/// One response per query: the two chart payloads plus the score and info
/// lines the page renders next to them.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub training_plot: Figure,
    pub future_plot: Figure,
    pub score_text: String,
    pub info_text: String,
}

impl DashboardView {
    /// The uniform failure output. Every cause renders identically; the
    /// distinction lives in the log.
    pub fn placeholder() -> Self {
        Self {
            training_plot: empty_figure(),
            future_plot: empty_figure(),
            score_text: NO_SCORE_TEXT.to_string(),
            info_text: NO_ASSET_TEXT.to_string(),
        }
    }
}

/// The request entry point. Never fails: both error boundaries (acquisition,
/// then everything downstream) log the typed cause and fall back to the
/// placeholder view.
pub async fn update_graph(
    query: &str,
    config: &PipelineConfig,
    cache: &HistoryCache,
) -> DashboardView {
    let series = match acquire(query, cache).await {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(error = %e, query, "data acquisition failed");
            return DashboardView::placeholder();
        }
    };

    match render(&series, config) {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(error = %e, symbol = %series.symbol, "pipeline failed");
            DashboardView::placeholder()
        }
    }
}

async fn acquire(query: &str, cache: &HistoryCache) -> Result<PriceSeries, PredictError> {
    if let Some(hit) = cache.get(query).await {
        tracing::debug!(query, "history cache hit");
        return Ok(hit);
    }

    let info = resolve_symbol(query).await?;
    let series = fetch_daily_history(&info).await?;
    tracing::info!(symbol = %series.symbol, points = series.len(), "fetched history");

    cache.insert(query.to_string(), series.clone()).await;
    Ok(series)
}

/// Pipeline plus presentation, synchronous and testable without a network.
pub fn render(series: &PriceSeries, config: &PipelineConfig) -> Result<DashboardView, PredictError> {
    let run = PipelineRun::new(config.clone());
    let out = run.execute(series)?;

    let title = format!("{} ({})", series.name, series.symbol);

    let training_plot = train_test_figure(
        &title,
        out.train_dates,
        out.train_closes,
        out.prediction_dates,
        out.predictions,
        out.test_dates,
        out.test_closes,
    );

    let future_plot = future_figure(
        series.dates(),
        series.closes(),
        out.forecast_dates,
        out.forecast,
    );

    Ok(DashboardView {
        training_plot,
        future_plot,
        score_text: format!("R2 Score : {:.4}", out.r2_score),
        info_text: title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    #[test]
    fn placeholder_carries_fixed_strings() {
        let view = DashboardView::placeholder();
        assert_eq!(view.score_text, NO_SCORE_TEXT);
        assert_eq!(view.info_text, NO_ASSET_TEXT);
        assert_eq!(view.training_plot.layout.xaxis.visible, Some(false));
        assert_eq!(view.future_plot.layout.yaxis.visible, Some(false));
    }

    #[test]
    fn render_rejects_empty_series() {
        let series = PriceSeries {
            symbol: "NONE".to_string(),
            name: String::new(),
            points: Vec::new(),
        };
        assert!(matches!(
            render(&series, &PipelineConfig::default()),
            Err(PredictError::EmptySeries(_))
        ));
    }

    #[tokio::test]
    async fn unrecognized_query_yields_placeholder() {
        // Whether the suggest endpoint is reachable or not, a nonsense query
        // cannot produce data, so the placeholder must come back.
        let cache = HistoryCache::new();
        let view = update_graph(
            "definitely-not-a-listed-asset-xyzzy",
            &PipelineConfig::default(),
            &cache,
        )
        .await;
        assert_eq!(view.score_text, NO_SCORE_TEXT);
        assert_eq!(view.info_text, NO_ASSET_TEXT);
        assert_eq!(view.training_plot.layout.annotations.len(), 1);
    }

    #[test]
    fn render_produces_both_figures_and_a_score() {
        let base = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = (0..120)
            .map(|i| PricePoint {
                date: (base + chrono::Duration::days(i as i64))
                    .format("%Y-%m-%d")
                    .to_string(),
                close: 50.0 + (i as f64) * 0.5,
            })
            .collect();
        let series = PriceSeries {
            symbol: "600519".to_string(),
            name: "Moutai".to_string(),
            points,
        };

        let config = PipelineConfig {
            epochs: 2,
            horizon: 5,
            ..PipelineConfig::default()
        };
        let view = render(&series, &config).unwrap();

        assert_eq!(view.training_plot.data.len(), 3);
        assert_eq!(view.future_plot.data.len(), 2);
        assert!(view.score_text.starts_with("R2 Score :"));
        assert_eq!(view.info_text, "Moutai (600519)");
        assert_eq!(view.future_plot.data[1].y.len(), 6);
    }
}
