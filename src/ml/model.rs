// ============================================================
// Layer 4 — Classifier Model (Burn)
// ============================================================
// A configurable-depth feed-forward network mapping a flattened
// pixel vector to class log-probabilities.
//
// Architecture for input D, output C, n_layers L:
//   L − 1 blocks of  Linear → LeakyReLU → (BatchNorm | Dropout)
//   then a final     Linear → log_softmax
// with hidden widths stepping evenly from D down toward C.
//
// The regularizer between linear layers is a tagged variant chosen
// once at construction — batch norm unless dropout is explicitly
// requested — so the forward pass never branches on configuration.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        LeakyRelu, LeakyReluConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::log_softmax,
};

/// Hidden layer widths interpolated between the input and output sizes.
///
/// With `input=784, output=10, n_layers=5` the step is 154 and the
/// widths are `[630, 476, 322, 168]` — one entry per hidden layer,
/// i.e. `n_layers - 1` entries; the final projection to `output`
/// is a separate layer.
pub fn hidden_sizes(input_size: usize, output_size: usize, n_layers: usize) -> Vec<usize> {
    let step = (input_size as i64 - output_size as i64) / n_layers.max(1) as i64;

    let mut sizes   = Vec::with_capacity(n_layers.saturating_sub(1));
    let mut current = input_size as i64;
    for _ in 1..n_layers {
        current -= step;
        sizes.push(current.max(1) as usize);
    }
    sizes
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Flattened input dimensionality (784 for MNIST)
    pub input_size:  usize,
    /// Number of output classes (10 for digits)
    pub output_size: usize,
    /// Total linear layer count, including the output projection
    #[config(default = 5)]
    pub n_layers:    usize,
    /// Use dropout between layers instead of batch normalization
    #[config(default = false)]
    pub use_dropout: bool,
    /// Dropout probability, only used when `use_dropout` is set
    #[config(default = 0.3)]
    pub dropout_p:   f64,
}

impl ClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ImageClassifier<B> {
        let mut blocks      = Vec::with_capacity(self.n_layers.saturating_sub(1));
        let mut in_features = self.input_size;

        for width in hidden_sizes(self.input_size, self.output_size, self.n_layers) {
            blocks.push(self.build_block(in_features, width, device));
            in_features = width;
        }

        let output = LinearConfig::new(in_features, self.output_size).init(device);

        ImageClassifier { blocks, output }
    }

    fn build_block<B: Backend>(
        &self,
        in_features:  usize,
        out_features: usize,
        device:       &B::Device,
    ) -> ClassifierBlock<B> {
        // Mutually exclusive by construction: exactly one variant exists
        // in the built model, picked here and never re-decided at runtime.
        let regularizer = if self.use_dropout {
            Regularizer::Dropout(DropoutConfig::new(self.dropout_p).init())
        } else {
            Regularizer::BatchNorm(BatchNormConfig::new(out_features).init(device))
        };

        ClassifierBlock {
            linear:      LinearConfig::new(in_features, out_features).init(device),
            activation:  LeakyReluConfig::new().init(),
            regularizer,
        }
    }
}

/// The layer inserted between linear transforms: batch normalization
/// to stabilize training, or dropout to regularize it. Dropout is a
/// no-op outside training mode, so validation is deterministic.
#[derive(Module, Debug)]
pub enum Regularizer<B: Backend> {
    BatchNorm(BatchNorm<B, 0>),
    Dropout(Dropout),
}

impl<B: Backend> Regularizer<B> {
    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Regularizer::BatchNorm(norm) => norm.forward(input),
            Regularizer::Dropout(dropout) => dropout.forward(input),
        }
    }
}

#[derive(Module, Debug)]
pub struct ClassifierBlock<B: Backend> {
    linear:      Linear<B>,
    activation:  LeakyRelu,
    regularizer: Regularizer<B>,
}

impl<B: Backend> ClassifierBlock<B> {
    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(input);
        let x = self.activation.forward(x);
        self.regularizer.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct ImageClassifier<B: Backend> {
    blocks: Vec<ClassifierBlock<B>>,
    output: Linear<B>,
}

impl<B: Backend> ImageClassifier<B> {
    /// Forward pass: `[batch, input_size]` pixels to `[batch, output_size]`
    /// log-probabilities, suitable for negative-log-likelihood loss.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for block in self.blocks.iter() {
            x = block.forward(x);
        }
        let scores = self.output.forward(x);
        log_softmax(scores, 1)
    }
}
