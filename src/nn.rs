//! Neurons, layers and multi-layer perceptrons assembled from [`Value`]s.
//!
//! These only build graphs; fitting them is left to the caller, who can
//! collect the trainable values through [`Module::parameters`].

use crate::engine::*;
use crate::error::{Error, Result};
use itertools::Itertools;
use rand::Rng;
use std::iter::zip;

/// Leak factor used for leaky ReLU unless another one is chosen.
pub const DEFAULT_LEAK: ValueType = 0.01;

pub trait Module {
    fn zero_grad(&self) {
        self.parameters().iter().for_each(|v| v.reset_grad())
    }

    fn parameters(&self) -> Vec<Value>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activation {
    Linear,
    Relu,
    LeakyRelu(ValueType),
    Tanh,
}

impl Activation {
    fn apply(&self, x: Value) -> Value {
        match *self {
            Activation::Linear => x,
            Activation::Relu => x.relu(),
            Activation::LeakyRelu(alpha) => x.leaky_relu(alpha),
            Activation::Tanh => x.tanh(),
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activation::Linear => f.write_str("Linear"),
            Activation::Relu => f.write_str("ReLU"),
            Activation::LeakyRelu(_) => f.write_str("LeakyReLU"),
            Activation::Tanh => f.write_str("Tanh"),
        }
    }
}

pub struct Neuron {
    w: Vec<Value>,
    b: Value,
    activation: Activation,
}

impl Neuron {
    pub fn new<R: Rng>(rng: &mut R, nin: usize, activation: Activation) -> Self {
        let w = (0..nin)
            .map(|_| rng.gen_range(-1.0..1.0))
            .map(Value::new)
            .collect();
        Self {
            w,
            b: Value::new(Default::default()),
            activation,
        }
    }

    pub fn nin(&self) -> usize {
        self.w.len()
    }

    pub fn run(&self, x: &[Value]) -> Result<Value> {
        if x.len() != self.w.len() {
            return Err(Error::DimensionMismatch {
                expected: self.w.len(),
                got: x.len(),
            });
        }

        let sum = zip(&self.w, x).fold(self.b.clone(), |acc, (wi, xi)| acc + wi * xi);

        Ok(self.activation.apply(sum))
    }
}

impl Module for Neuron {
    fn parameters(&self) -> Vec<Value> {
        let mut params = self.w.clone();
        params.push(self.b.clone());

        params
    }
}

impl std::fmt::Display for Neuron {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Neuron({})", self.activation, self.w.len())
    }
}

pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new<R: Rng>(rng: &mut R, nin: usize, nout: usize, activation: Activation) -> Self {
        let neurons = (0..nout)
            .map(|_| Neuron::new(rng, nin, activation))
            .collect();

        Self { neurons }
    }

    pub fn run(&self, x: &[Value]) -> Result<Vec<Value>> {
        self.neurons.iter().map(|n| n.run(x)).collect()
    }
}

impl Module for Layer {
    fn parameters(&self) -> Vec<Value> {
        self.neurons.iter().flat_map(|x| x.parameters()).collect()
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Layer of [{}]", self.neurons.iter().join(", "))
    }
}

pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// Builds `nouts.len()` layers; all but the last use `activation`, the
    /// last is linear.
    pub fn new<R: Rng>(rng: &mut R, nin: usize, nouts: &[usize], activation: Activation) -> Self {
        let sizes = std::iter::once(nin).chain(nouts.iter().copied());

        let layers = sizes
            .tuple_windows()
            .enumerate()
            .map(|(n, (lin, lout))| {
                let activation = if n + 1 == nouts.len() {
                    Activation::Linear
                } else {
                    activation
                };
                Layer::new(rng, lin, lout, activation)
            })
            .collect();

        Self { layers }
    }

    pub fn run(&self, x: &[Value]) -> Result<Vec<Value>> {
        let mut x = x.to_vec();
        for layer in &self.layers {
            x = layer.run(&x)?;
        }

        Ok(x)
    }
}

impl Module for Mlp {
    fn parameters(&self) -> Vec<Value> {
        self.layers.iter().flat_map(|x| x.parameters()).collect()
    }
}

impl std::fmt::Display for Mlp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MLP of [{}]", self.layers.iter().join(", "))
    }
}
