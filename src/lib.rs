pub mod cache;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod types;

pub use error::PredictError;
pub use types::{PricePoint, PriceSeries, SecurityInfo};
