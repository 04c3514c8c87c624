use std::fmt;

/// Everything that can go wrong between a ticker query and the two figures.
///
/// The dashboard collapses all of these into the same placeholder output,
/// but each cause is kept distinct so the log tells them apart.
#[derive(Debug)]
pub enum PredictError {
    /// Transport-level failure talking to the data provider.
    Network(String),
    /// The provider answered but the payload was unusable.
    Provider(String),
    /// No price history came back for the query.
    EmptySeries(String),
    /// Lookback window does not fit in the available data.
    InvalidLookback { lookback: usize, len: usize },
    /// Prediction and ground-truth slices disagree on length.
    LengthMismatch { actual: usize, predicted: usize },
    /// Model training could not proceed.
    Training(String),
    /// A provider date failed to parse.
    Date(String),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::Network(msg) => write!(f, "Network error: {}", msg),
            PredictError::Provider(msg) => write!(f, "Provider error: {}", msg),
            PredictError::EmptySeries(query) => {
                write!(f, "No price data for query: {}", query)
            }
            PredictError::InvalidLookback { lookback, len } => write!(
                f,
                "Lookback {} does not fit a series of length {}",
                lookback, len
            ),
            PredictError::LengthMismatch { actual, predicted } => write!(
                f,
                "Evaluation length mismatch: {} actual vs {} predicted",
                actual, predicted
            ),
            PredictError::Training(msg) => write!(f, "Training error: {}", msg),
            PredictError::Date(msg) => write!(f, "Date error: {}", msg),
        }
    }
}

impl std::error::Error for PredictError {}

impl From<reqwest::Error> for PredictError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            PredictError::Network(e.to_string())
        } else {
            PredictError::Provider(e.to_string())
        }
    }
}
