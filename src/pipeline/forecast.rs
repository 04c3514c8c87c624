use crate::error::PredictError;
use crate::pipeline::model::LstmNetwork;
use chrono::NaiveDate;

/// Autoregressive extrapolation. Seeds a buffer with the last `lookback`
/// observed scaled values, then one step at a time runs the model on the
/// trailing window and appends the prediction, so later steps feed on
/// earlier predictions. Step order matters; this loop cannot run ahead of
/// itself.
///
/// The returned buffer is trimmed to `[lookback - 1 ..]`, giving
/// `horizon + 1` values whose first element is the last observed value.
/// Scaled space in, scaled space out.
pub fn forecast(
    model: &mut LstmNetwork,
    scaled_history: &[f64],
    horizon: usize,
) -> Result<Vec<f64>, PredictError> {
    let lookback = model.lookback();
    if scaled_history.len() < lookback {
        return Err(PredictError::InvalidLookback {
            lookback,
            len: scaled_history.len(),
        });
    }

    let mut buffer: Vec<f64> = scaled_history[scaled_history.len() - lookback..].to_vec();

    for _ in 0..horizon {
        let window = &buffer[buffer.len() - lookback..];
        let next = model.predict_next(window)?;
        buffer.push(next);
    }

    Ok(buffer[lookback - 1..].to_vec())
}

/// Calendar dates for the forecast trace: `horizon + 1` consecutive days
/// starting at the last observed date, matching the trimmed forecast buffer.
pub fn forecast_dates(last_date: &str, horizon: usize) -> Result<Vec<String>, PredictError> {
    let base = parse_date(last_date)?;
    Ok((0..=horizon as i64)
        .map(|i| (base + chrono::Duration::days(i)).format("%Y-%m-%d").to_string())
        .collect())
}

fn parse_date(date_str: &str) -> Result<NaiveDate, PredictError> {
    let date_part = date_str.split(' ').next().unwrap_or(date_str);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .map_err(|e| PredictError::Date(format!("Failed to parse date {}: {}", date_str, e)))
}
