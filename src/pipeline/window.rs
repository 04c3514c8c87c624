use crate::error::PredictError;

/// Lazy sliding-window view over a scaled series: yields `(window, target)`
/// pairs where the window covers `[i, i + lookback)` and the target is the
/// element at `i + lookback`. Exactly `len - lookback` pairs come out.
/// Batching for gradient updates is the trainer's concern, not this one's.
pub struct Windows<'a> {
    data: &'a [f64],
    lookback: usize,
    pos: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = (&'a [f64], f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos + self.lookback >= self.data.len() {
            return None;
        }
        let window = &self.data[self.pos..self.pos + self.lookback];
        let target = self.data[self.pos + self.lookback];
        self.pos += 1;
        Some((window, target))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len() - self.lookback - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

pub fn windows(data: &[f64], lookback: usize) -> Result<Windows<'_>, PredictError> {
    if lookback == 0 || lookback >= data.len() {
        return Err(PredictError::InvalidLookback {
            lookback,
            len: data.len(),
        });
    }
    Ok(Windows {
        data,
        lookback,
        pos: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_len_minus_lookback_pairs() {
        let data: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let pairs: Vec<_> = windows(&data, 5).unwrap().collect();

        assert_eq!(pairs.len(), 15);
        for (window, target) in &pairs {
            assert_eq!(window.len(), 5);
            // Target immediately follows its window in the source sequence.
            assert_eq!(window[4] + 1.0, *target);
        }
        assert_eq!(pairs[0].0, &data[..5]);
        assert_eq!(pairs[0].1, 5.0);
        assert_eq!(pairs[14].1, 19.0);
    }

    #[test]
    fn lookback_too_large_is_an_error() {
        let data = [1.0, 2.0, 3.0];
        assert!(matches!(
            windows(&data, 3),
            Err(PredictError::InvalidLookback { lookback: 3, len: 3 })
        ));
        assert!(windows(&data, 4).is_err());
        assert!(windows(&data, 2).is_ok());
    }

    #[test]
    fn zero_lookback_is_an_error() {
        assert!(windows(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn reports_exact_size() {
        let data: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let iter = windows(&data, 15).unwrap();
        assert_eq!(iter.len(), 85);
    }
}
