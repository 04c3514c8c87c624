use crate::error::PredictError;

/// Coefficient of determination over the evaluable region of a partition.
///
/// One-step predictions exist only from index `lookback` onward, so the
/// caller passes `partition[lookback..]` as the actual slice. The two slices
/// must already agree on length; a mismatch is a hard error rather than a
/// silent truncation.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<f64, PredictError> {
    if actual.len() != predicted.len() {
        return Err(PredictError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(PredictError::LengthMismatch {
            actual: 0,
            predicted: 0,
        });
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;

    for (a, p) in actual.iter().zip(predicted.iter()) {
        ss_res += (a - p).powi(2);
        ss_tot += (a - mean).powi(2);
    }

    if ss_tot == 0.0 {
        return Ok(0.0);
    }

    Ok(1.0 - (ss_res / ss_tot))
}
