/// Min-max scaler into [0, 1]. Fitted on the training partition only; the
/// same statistics are reused on the test partition so no test information
/// leaks into the scaling. Owned by a single pipeline run, never shared.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    pub fn fit(data: &[f64]) -> Self {
        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        Self { min, max }
    }

    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        let range = self.max - self.min;
        if range == 0.0 {
            return vec![0.5; data.len()];
        }
        data.iter().map(|&x| (x - self.min) / range).collect()
    }

    pub fn inverse_transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .map(|&x| self.inverse_transform_scalar(x))
            .collect()
    }

    pub fn inverse_transform_scalar(&self, val: f64) -> f64 {
        val * (self.max - self.min) + self.min
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
