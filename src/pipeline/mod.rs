pub mod forecast;
pub mod metrics;
pub mod model;
pub mod scaler;
pub mod split;
pub mod window;

use crate::error::PredictError;
use crate::types::PriceSeries;
use forecast::{forecast, forecast_dates};
use metrics::r_squared;
use model::{supervised_tensors, LstmNetwork, ModelConfig};
use scaler::MinMaxScaler;
use split::split_series;

/// Hyperparameters for one end-to-end run. Matches the dashboard defaults:
/// lookback 15, 80/20 split, 20 epochs, batch 20, 30-day forecast.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub lookback: usize,
    pub split_ratio: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub horizon: usize,
    pub hidden_size: usize,
    pub learning_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback: 15,
            split_ratio: 0.8,
            epochs: 20,
            batch_size: 20,
            horizon: 30,
            hidden_size: 10,
            learning_rate: 0.001,
        }
    }
}

impl PipelineConfig {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            lookback: self.lookback,
            hidden_size: self.hidden_size,
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            batch_size: self.batch_size,
            ..ModelConfig::default()
        }
    }
}

/// Everything the presentation layer needs, already back in price space.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub train_dates: Vec<String>,
    pub train_closes: Vec<f64>,
    pub test_dates: Vec<String>,
    pub test_closes: Vec<f64>,
    /// Dates for the one-step test predictions: `test_dates[lookback..]`.
    pub prediction_dates: Vec<String>,
    pub predictions: Vec<f64>,
    pub r2_score: f64,
    pub forecast_dates: Vec<String>,
    pub forecast: Vec<f64>,
}

/// One pipeline run. The scaler and the model weights are owned here and
/// dropped with the run, so nothing carries over between requests.
pub struct PipelineRun {
    config: PipelineConfig,
    seed: Option<u64>,
}

impl PipelineRun {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config, seed: None }
    }

    /// Deterministic weights for tests.
    pub fn with_seed(config: PipelineConfig, seed: u64) -> Self {
        Self {
            config,
            seed: Some(seed),
        }
    }

    pub fn execute(&self, series: &PriceSeries) -> Result<PipelineOutput, PredictError> {
        if series.is_empty() {
            return Err(PredictError::EmptySeries(series.symbol.clone()));
        }

        let closes = series.closes();
        let dates = series.dates();
        let lookback = self.config.lookback;

        let split = split_series(&closes, self.config.split_ratio);
        let (train_dates, test_dates) = (
            dates[..split.split_index].to_vec(),
            dates[split.split_index..].to_vec(),
        );

        // Fit on train only; the same statistics scale the test partition.
        let scaler = MinMaxScaler::fit(&split.train);
        let train_scaled = scaler.transform(&split.train);
        let test_scaled = scaler.transform(&split.test);

        let (x_train, y_train) = supervised_tensors(&train_scaled, lookback)?;

        let model_config = self.config.model_config();
        let mut model = match self.seed {
            Some(seed) => LstmNetwork::seeded(&model_config, seed),
            None => LstmNetwork::new(&model_config),
        };
        model.fit(&x_train, &y_train)?;

        // One-step predictions exist from test index `lookback` onward.
        let predictions_scaled = model.predict_series(&test_scaled)?;
        let r2_score = r_squared(&test_scaled[lookback..], &predictions_scaled)?;

        let mut full_scaled = train_scaled;
        full_scaled.extend_from_slice(&test_scaled);
        let forecast_scaled = forecast(&mut model, &full_scaled, self.config.horizon)?;

        let last_date = dates
            .last()
            .ok_or_else(|| PredictError::EmptySeries(series.symbol.clone()))?;
        let fc_dates = forecast_dates(last_date, self.config.horizon)?;

        Ok(PipelineOutput {
            train_dates,
            train_closes: split.train,
            prediction_dates: test_dates[lookback..].to_vec(),
            test_dates,
            test_closes: split.test,
            predictions: scaler.inverse_transform(&predictions_scaled),
            r2_score,
            forecast_dates: fc_dates,
            forecast: scaler.inverse_transform(&forecast_scaled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    fn linear_series(len: usize) -> PriceSeries {
        let base = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = (0..len)
            .map(|i| PricePoint {
                date: (base + chrono::Duration::days(i as i64))
                    .format("%Y-%m-%d")
                    .to_string(),
                close: 100.0 + i as f64,
            })
            .collect();
        PriceSeries {
            symbol: "TEST".to_string(),
            name: "Test Asset".to_string(),
            points,
        }
    }

    #[test]
    fn empty_series_is_rejected() {
        let run = PipelineRun::new(PipelineConfig::default());
        let series = PriceSeries {
            symbol: "NONE".to_string(),
            name: String::new(),
            points: Vec::new(),
        };
        assert!(matches!(
            run.execute(&series),
            Err(PredictError::EmptySeries(_))
        ));
    }

    #[test]
    fn short_series_surfaces_invalid_lookback() {
        let run = PipelineRun::new(PipelineConfig::default());
        // 20 points leave a test partition of 4, smaller than the lookback.
        let result = run.execute(&linear_series(20));
        assert!(matches!(
            result,
            Err(PredictError::InvalidLookback { .. })
        ));
    }

    #[test]
    fn output_shapes_line_up() {
        let config = PipelineConfig {
            epochs: 2,
            ..PipelineConfig::default()
        };
        let run = PipelineRun::with_seed(config.clone(), 11);
        let out = run.execute(&linear_series(200)).unwrap();

        assert_eq!(out.train_closes.len(), 160);
        assert_eq!(out.test_closes.len(), 40);
        assert_eq!(out.predictions.len(), 40 - config.lookback);
        assert_eq!(out.prediction_dates.len(), out.predictions.len());
        assert_eq!(out.forecast.len(), config.horizon + 1);
        assert_eq!(out.forecast_dates.len(), config.horizon + 1);
        assert_eq!(out.forecast_dates[0], out.test_dates.last().unwrap().clone());
        // Forecast is anchored at the last observed close.
        assert!((out.forecast[0] - out.test_closes.last().unwrap()).abs() < 1e-9);
    }
}
