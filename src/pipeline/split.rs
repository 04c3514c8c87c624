/// Time-respecting 80/20 partition of a close series. No shuffling; the
/// train half is always a strict prefix.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<f64>,
    pub test: Vec<f64>,
    pub split_index: usize,
}

pub fn split_series(closes: &[f64], split_ratio: f64) -> TrainTestSplit {
    let split_index = (split_ratio * closes.len() as f64) as usize;
    TrainTestSplit {
        train: closes[..split_index].to_vec(),
        test: closes[split_index..].to_vec(),
        split_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_contiguous_prefix() {
        let closes: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let split = split_series(&closes, 0.8);

        assert_eq!(split.split_index, 80);
        assert_eq!(split.train.len() + split.test.len(), closes.len());
        assert_eq!(split.train, closes[..80].to_vec());
        assert_eq!(split.test[0], 80.0);
    }

    #[test]
    fn split_index_floors() {
        let closes: Vec<f64> = (0..103).map(|i| i as f64).collect();
        let split = split_series(&closes, 0.8);
        // floor(0.8 * 103) = 82
        assert_eq!(split.train.len(), 82);
        assert_eq!(split.test.len(), 21);
    }

    #[test]
    fn empty_series_splits_empty() {
        let split = split_series(&[], 0.8);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }
}
