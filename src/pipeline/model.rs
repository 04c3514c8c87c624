use crate::error::PredictError;
use crate::pipeline::window::windows;
use ndarray::{Array, Array1, Array2, Axis, Dimension};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Fixed architecture: LSTM(10) over lookback-length windows of scalars,
/// then Dense(1, ReLU) -> Dense(2, ReLU) -> Dense(3, linear). The prediction
/// is read from the first output unit. Weights live for one pipeline run.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub lookback: usize,
    pub hidden_size: usize,
    pub dense_sizes: Vec<usize>,
    pub output_size: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            lookback: 15,
            hidden_size: 10,
            dense_sizes: vec![1, 2],
            output_size: 3,
            learning_rate: 0.001,
            epochs: 20,
            batch_size: 20,
        }
    }
}

const ADAGRAD_EPS: f64 = 1e-8;

/// Adagrad: per-parameter accumulated squared gradient scales the step.
fn adagrad_step<D: Dimension>(
    param: &mut Array<f64, D>,
    acc: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    lr: f64,
) {
    *acc += &grad.mapv(|g| g * g);
    let denom = acc.mapv(|a| a.sqrt() + ADAGRAD_EPS);
    let step = grad / &denom;
    *param -= &(step * lr);
}

fn sigmoid(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(f64::tanh)
}

/// Dense layer with cached forward state for backprop.
struct DenseLayer {
    weights: Array2<f64>,
    biases: Array1<f64>,
    relu: bool,
    inputs: Option<Array2<f64>>,
    z: Option<Array2<f64>>,
    acc_w: Array2<f64>,
    acc_b: Array1<f64>,
}

impl DenseLayer {
    fn new(input_size: usize, output_size: usize, relu: bool, rng: &mut StdRng) -> Self {
        // Xavier/Glorot initialization
        let limit = (6.0 / (input_size + output_size) as f64).sqrt();
        let weights =
            Array2::random_using((input_size, output_size), Uniform::new(-limit, limit), rng);
        Self {
            weights,
            biases: Array1::zeros(output_size),
            relu,
            inputs: None,
            z: None,
            acc_w: Array2::zeros((input_size, output_size)),
            acc_b: Array1::zeros(output_size),
        }
    }

    fn forward(&mut self, input: &Array2<f64>) -> Array2<f64> {
        let z = input.dot(&self.weights) + &self.biases;
        self.inputs = Some(input.clone());
        self.z = Some(z.clone());
        if self.relu {
            z.mapv(|x| if x > 0.0 { x } else { 0.0 })
        } else {
            z
        }
    }

    /// Takes the gradient w.r.t. this layer's output, updates the weights,
    /// returns the gradient w.r.t. the layer input.
    fn backward(&mut self, d_output: &Array2<f64>, lr: f64) -> Result<Array2<f64>, PredictError> {
        let z = self
            .z
            .as_ref()
            .ok_or_else(|| PredictError::Training("backward before forward".to_string()))?;
        let inputs = self
            .inputs
            .as_ref()
            .ok_or_else(|| PredictError::Training("backward before forward".to_string()))?;

        let d_z = if self.relu {
            let mask = z.mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
            d_output * &mask
        } else {
            d_output.clone()
        };

        let d_weights = inputs.t().dot(&d_z);
        let d_biases = d_z.sum_axis(Axis(0));
        let d_input = d_z.dot(&self.weights.t());

        adagrad_step(&mut self.weights, &mut self.acc_w, &d_weights, lr);
        adagrad_step(&mut self.biases, &mut self.acc_b, &d_biases, lr);

        Ok(d_input)
    }
}

/// Per-timestep forward state kept for the backward pass.
struct StepCache {
    x: Array2<f64>,
    h_prev: Array2<f64>,
    c_prev: Array2<f64>,
    i: Array2<f64>,
    f: Array2<f64>,
    g: Array2<f64>,
    o: Array2<f64>,
    tanh_c: Array2<f64>,
}

struct GateParam {
    w_x: Array2<f64>,
    w_h: Array2<f64>,
    b: Array1<f64>,
    acc_wx: Array2<f64>,
    acc_wh: Array2<f64>,
    acc_b: Array1<f64>,
}

impl GateParam {
    fn new(input_size: usize, hidden_size: usize, bias: f64, rng: &mut StdRng) -> Self {
        let limit = (1.0 / hidden_size as f64).sqrt();
        Self {
            w_x: Array2::random_using((input_size, hidden_size), Uniform::new(-limit, limit), rng),
            w_h: Array2::random_using((hidden_size, hidden_size), Uniform::new(-limit, limit), rng),
            b: Array1::from_elem(hidden_size, bias),
            acc_wx: Array2::zeros((input_size, hidden_size)),
            acc_wh: Array2::zeros((hidden_size, hidden_size)),
            acc_b: Array1::zeros(hidden_size),
        }
    }

    fn pre_activation(&self, x: &Array2<f64>, h_prev: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.w_x) + h_prev.dot(&self.w_h) + &self.b
    }
}

struct GateGrads {
    d_wx: Array2<f64>,
    d_wh: Array2<f64>,
    d_b: Array1<f64>,
}

impl GateGrads {
    fn zeros(input_size: usize, hidden_size: usize) -> Self {
        Self {
            d_wx: Array2::zeros((input_size, hidden_size)),
            d_wh: Array2::zeros((hidden_size, hidden_size)),
            d_b: Array1::zeros(hidden_size),
        }
    }

    fn accumulate(&mut self, d_pre: &Array2<f64>, cache: &StepCache) {
        self.d_wx += &cache.x.t().dot(d_pre);
        self.d_wh += &cache.h_prev.t().dot(d_pre);
        self.d_b += &d_pre.sum_axis(Axis(0));
    }
}

/// Single LSTM layer over sequences of scalars, with full backpropagation
/// through time. Standard sigmoid gates and tanh candidate; forget bias
/// starts at 1 so early training does not wipe the cell state.
struct LstmCell {
    hidden_size: usize,
    input_gate: GateParam,
    forget_gate: GateParam,
    cell_gate: GateParam,
    output_gate: GateParam,
    caches: Vec<StepCache>,
}

impl LstmCell {
    fn new(hidden_size: usize, rng: &mut StdRng) -> Self {
        Self {
            hidden_size,
            input_gate: GateParam::new(1, hidden_size, 0.0, rng),
            forget_gate: GateParam::new(1, hidden_size, 1.0, rng),
            cell_gate: GateParam::new(1, hidden_size, 0.0, rng),
            output_gate: GateParam::new(1, hidden_size, 0.0, rng),
            caches: Vec::new(),
        }
    }

    /// Runs the whole sequence, returns the final hidden state.
    /// `x` is (batch, seq_len); each feature is the scalar close value.
    fn forward(&mut self, x: &Array2<f64>) -> Array2<f64> {
        let batch = x.nrows();
        let seq_len = x.ncols();

        self.caches.clear();
        let mut h = Array2::zeros((batch, self.hidden_size));
        let mut c: Array2<f64> = Array2::zeros((batch, self.hidden_size));

        for t in 0..seq_len {
            let x_t = x.column(t).to_owned().insert_axis(Axis(1));

            let i = sigmoid(&self.input_gate.pre_activation(&x_t, &h));
            let f = sigmoid(&self.forget_gate.pre_activation(&x_t, &h));
            let g = tanh(&self.cell_gate.pre_activation(&x_t, &h));
            let o = sigmoid(&self.output_gate.pre_activation(&x_t, &h));

            let c_next = &f * &c + &i * &g;
            let tanh_c = tanh(&c_next);
            let h_next = &o * &tanh_c;

            self.caches.push(StepCache {
                x: x_t,
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                tanh_c,
            });

            h = h_next;
            c = c_next;
        }

        h
    }

    /// BPTT from the gradient of the final hidden state. Updates every gate
    /// once per batch with the accumulated gradients.
    fn backward(&mut self, d_h_final: &Array2<f64>, lr: f64) {
        let batch = d_h_final.nrows();

        let mut gi = GateGrads::zeros(1, self.hidden_size);
        let mut gf = GateGrads::zeros(1, self.hidden_size);
        let mut gg = GateGrads::zeros(1, self.hidden_size);
        let mut go = GateGrads::zeros(1, self.hidden_size);

        let mut d_h = d_h_final.clone();
        let mut d_c: Array2<f64> = Array2::zeros((batch, self.hidden_size));

        for cache in self.caches.iter().rev() {
            let d_o = &d_h * &cache.tanh_c;
            let d_o_pre = &d_o * &(&cache.o * &cache.o.mapv(|v| 1.0 - v));

            let d_c_total = &d_c + &(&d_h * &cache.o * &cache.tanh_c.mapv(|v| 1.0 - v * v));

            let d_i = &d_c_total * &cache.g;
            let d_i_pre = &d_i * &(&cache.i * &cache.i.mapv(|v| 1.0 - v));

            let d_g = &d_c_total * &cache.i;
            let d_g_pre = &d_g * &cache.g.mapv(|v| 1.0 - v * v);

            let d_f = &d_c_total * &cache.c_prev;
            let d_f_pre = &d_f * &(&cache.f * &cache.f.mapv(|v| 1.0 - v));

            gi.accumulate(&d_i_pre, cache);
            gf.accumulate(&d_f_pre, cache);
            gg.accumulate(&d_g_pre, cache);
            go.accumulate(&d_o_pre, cache);

            d_h = d_i_pre.dot(&self.input_gate.w_h.t())
                + d_f_pre.dot(&self.forget_gate.w_h.t())
                + d_g_pre.dot(&self.cell_gate.w_h.t())
                + d_o_pre.dot(&self.output_gate.w_h.t());
            d_c = &d_c_total * &cache.f;
        }

        for (gate, grads) in [
            (&mut self.input_gate, &gi),
            (&mut self.forget_gate, &gf),
            (&mut self.cell_gate, &gg),
            (&mut self.output_gate, &go),
        ] {
            adagrad_step(&mut gate.w_x, &mut gate.acc_wx, &grads.d_wx, lr);
            adagrad_step(&mut gate.w_h, &mut gate.acc_wh, &grads.d_wh, lr);
            adagrad_step(&mut gate.b, &mut gate.acc_b, &grads.d_b, lr);
        }
    }
}

pub struct LstmNetwork {
    config: ModelConfig,
    cell: LstmCell,
    dense: Vec<DenseLayer>,
    rng: StdRng,
}

impl LstmNetwork {
    pub fn new(config: &ModelConfig) -> Self {
        Self::seeded(config, rand::random())
    }

    /// Deterministic construction for tests.
    pub fn seeded(config: &ModelConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cell = LstmCell::new(config.hidden_size, &mut rng);

        let mut dense = Vec::new();
        let mut in_size = config.hidden_size;
        for &size in &config.dense_sizes {
            dense.push(DenseLayer::new(in_size, size, true, &mut rng));
            in_size = size;
        }
        dense.push(DenseLayer::new(in_size, config.output_size, false, &mut rng));

        Self {
            config: config.clone(),
            cell,
            dense,
            rng,
        }
    }

    fn forward(&mut self, x: &Array2<f64>) -> Array2<f64> {
        let mut current = self.cell.forward(x);
        for layer in &mut self.dense {
            current = layer.forward(&current);
        }
        current
    }

    fn mse(output: &Array2<f64>, targets: &Array1<f64>) -> f64 {
        let mut sum = 0.0;
        for (row, &y) in output.axis_iter(Axis(0)).zip(targets.iter()) {
            for &v in row.iter() {
                sum += (v - y).powi(2);
            }
        }
        sum / (output.nrows() * output.ncols()) as f64
    }

    /// One gradient-descent fit over windowed training data. `inputs` is
    /// (samples, lookback), `targets` the next scaled value per sample.
    pub fn fit(&mut self, inputs: &Array2<f64>, targets: &Array1<f64>) -> Result<(), PredictError> {
        let n_samples = inputs.nrows();
        if n_samples == 0 {
            return Err(PredictError::Training("no training samples".to_string()));
        }
        if targets.len() != n_samples {
            return Err(PredictError::Training(format!(
                "{} inputs but {} targets",
                n_samples,
                targets.len()
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();

        for epoch in 0..self.config.epochs {
            indices.shuffle(&mut self.rng);
            let mut epoch_loss = 0.0;
            let mut n_batches = 0;

            for chunk in indices.chunks(self.config.batch_size) {
                let batch = chunk.len();
                let mut x_vec = Vec::with_capacity(batch * self.config.lookback);
                let mut y_vec = Vec::with_capacity(batch);
                for &idx in chunk {
                    x_vec.extend(inputs.row(idx).iter().copied());
                    y_vec.push(targets[idx]);
                }
                let x_batch = Array2::from_shape_vec((batch, self.config.lookback), x_vec)
                    .map_err(|e| PredictError::Training(e.to_string()))?;
                let y_batch = Array1::from_vec(y_vec);

                let output = self.forward(&x_batch);
                epoch_loss += Self::mse(&output, &y_batch);
                n_batches += 1;

                // MSE gradient, target broadcast across the output units.
                let denom = (batch * self.config.output_size) as f64;
                let mut d_output = output;
                for (mut row, &y) in d_output.axis_iter_mut(Axis(0)).zip(y_batch.iter()) {
                    row.mapv_inplace(|v| 2.0 * (v - y) / denom);
                }

                let mut d_current = d_output;
                for layer in self.dense.iter_mut().rev() {
                    d_current = layer.backward(&d_current, self.config.learning_rate)?;
                }
                self.cell.backward(&d_current, self.config.learning_rate);
            }

            tracing::debug!(
                epoch,
                loss = epoch_loss / n_batches as f64,
                "training epoch finished"
            );
        }

        Ok(())
    }

    /// Next-value prediction for a single window of `lookback` scaled values.
    pub fn predict_next(&mut self, window: &[f64]) -> Result<f64, PredictError> {
        if window.len() != self.config.lookback {
            return Err(PredictError::InvalidLookback {
                lookback: self.config.lookback,
                len: window.len(),
            });
        }
        let x = Array2::from_shape_vec((1, window.len()), window.to_vec())
            .map_err(|e| PredictError::Training(e.to_string()))?;
        let output = self.forward(&x);
        Ok(output[[0, 0]])
    }

    /// One-step-ahead predictions over every window of a scaled partition.
    /// Output index 0 corresponds to partition index `lookback`.
    pub fn predict_series(&mut self, scaled: &[f64]) -> Result<Vec<f64>, PredictError> {
        let lookback = self.config.lookback;
        let pairs: Vec<(&[f64], f64)> = windows(scaled, lookback)?.collect();

        let mut x_vec = Vec::with_capacity(pairs.len() * lookback);
        for (window, _) in &pairs {
            x_vec.extend_from_slice(window);
        }
        let x = Array2::from_shape_vec((pairs.len(), lookback), x_vec)
            .map_err(|e| PredictError::Training(e.to_string()))?;

        let output = self.forward(&x);
        Ok(output.column(0).to_vec())
    }

    pub fn lookback(&self) -> usize {
        self.config.lookback
    }
}

/// Windowed training tensors from a scaled partition.
pub fn supervised_tensors(
    scaled: &[f64],
    lookback: usize,
) -> Result<(Array2<f64>, Array1<f64>), PredictError> {
    let pairs: Vec<(&[f64], f64)> = windows(scaled, lookback)?.collect();

    let mut x_vec = Vec::with_capacity(pairs.len() * lookback);
    let mut y_vec = Vec::with_capacity(pairs.len());
    for (window, target) in &pairs {
        x_vec.extend_from_slice(window);
        y_vec.push(*target);
    }

    let x = Array2::from_shape_vec((pairs.len(), lookback), x_vec)
        .map_err(|e| PredictError::Training(e.to_string()))?;
    Ok((x, Array1::from_vec(y_vec)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_shapes() {
        let config = ModelConfig::default();
        let mut net = LstmNetwork::seeded(&config, 7);
        let x = Array2::zeros((4, config.lookback));
        let out = net.forward(&x);
        assert_eq!(out.shape(), &[4, 3]);
    }

    #[test]
    fn predict_next_rejects_wrong_window() {
        let config = ModelConfig::default();
        let mut net = LstmNetwork::seeded(&config, 7);
        assert!(net.predict_next(&[0.5; 10]).is_err());
        assert!(net.predict_next(&[0.5; 15]).is_ok());
    }

    #[test]
    fn supervised_tensors_shape() {
        let scaled: Vec<f64> = (0..50).map(|i| i as f64 / 50.0).collect();
        let (x, y) = supervised_tensors(&scaled, 15).unwrap();
        assert_eq!(x.shape(), &[35, 15]);
        assert_eq!(y.len(), 35);
        assert_eq!(y[0], scaled[15]);
    }

    #[test]
    fn fit_reduces_loss_on_constant_series() {
        let config = ModelConfig {
            epochs: 40,
            ..ModelConfig::default()
        };
        let mut net = LstmNetwork::seeded(&config, 42);

        let scaled = vec![0.5; 60];
        let (x, y) = supervised_tensors(&scaled, config.lookback).unwrap();

        let before = {
            let out = net.forward(&x);
            LstmNetwork::mse(&out, &y)
        };
        net.fit(&x, &y).unwrap();
        let after = {
            let out = net.forward(&x);
            LstmNetwork::mse(&out, &y)
        };

        assert!(after < before, "loss {:.6} -> {:.6}", before, after);
    }

    #[test]
    fn fit_rejects_empty_input() {
        let config = ModelConfig::default();
        let mut net = LstmNetwork::seeded(&config, 1);
        let x = Array2::zeros((0, config.lookback));
        let y = Array1::zeros(0);
        assert!(net.fit(&x, &y).is_err());
    }
}
