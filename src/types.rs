use serde::{Deserialize, Serialize};

/// One daily observation: provider date string ("%Y-%m-%d") and close price.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

/// Chronologically ordered daily close history for one security.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub name: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<String> {
        self.points.iter().map(|p| p.date.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityInfo {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}
