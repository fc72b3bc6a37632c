//! Fixed-topology feed-forward controller network.
//!
//! Every controller in the system is a dense 9→13→8 network: nine perception
//! inputs, thirteen ReLU hidden units, eight sigmoid outputs — one per
//! [`Action`](kumite_engine::Action) ordinal. The shape is compiled in;
//! there is no architecture search and no gradient learning. Networks change
//! only through the two genetic operators in this module:
//!
//! - [`Network::mutate`] - per-scalar perturbation: with a small chance a
//!   weight takes a large reset-like jump, otherwise it drifts by a small
//!   uniform step whose width scales with the current mutation rate
//! - [`Network::crossover`] - scalar-wise uniform crossover: each weight and
//!   bias of the child is taken from either parent with equal probability
//!
//! Both operators are RNG-generic so training can thread a seeded generator
//! through and reproduce a whole evolution run. The fixed array types make
//! shape mismatches unrepresentable here; dimension validation happens at
//! the serialization boundary (see [`payload`](crate::payload)).

use rand::Rng;

use kumite_engine::{Action, PERCEPTION_LEN};

/// Number of perception inputs.
pub const INPUT_COUNT: usize = 9;
/// Number of hidden units.
pub const HIDDEN_COUNT: usize = 13;
/// Number of outputs, one per action ordinal.
pub const OUTPUT_COUNT: usize = 8;
/// Hidden biases followed by output biases.
pub const BIAS_COUNT: usize = HIDDEN_COUNT + OUTPUT_COUNT;

// The network contract is shared with the engine: perception length and
// action count must line up with the compiled-in shape.
const _: () = assert!(INPUT_COUNT == PERCEPTION_LEN);
const _: () = assert!(OUTPUT_COUNT == Action::COUNT);

/// Probability that a mutated scalar takes the large reset-like jump.
const RESET_CHANCE: f64 = 0.1;
/// Half-width of the large jump distribution.
const RESET_SPAN: f32 = 2.0;
/// Initial weights are uniform in `[-INIT_SPAN, INIT_SPAN]`.
const INIT_SPAN: f32 = 1.0;

/// A dense two-layer network of compiled-in shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_weights: [[f32; HIDDEN_COUNT]; INPUT_COUNT],
    output_weights: [[f32; OUTPUT_COUNT]; HIDDEN_COUNT],
    biases: [f32; BIAS_COUNT],
}

impl Network {
    /// A network with every weight and bias zero. Produces 0.5 on every
    /// output, which fires no action under the strict 0.5 threshold.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            input_weights: [[0.0; HIDDEN_COUNT]; INPUT_COUNT],
            output_weights: [[0.0; OUTPUT_COUNT]; HIDDEN_COUNT],
            biases: [0.0; BIAS_COUNT],
        }
    }

    /// A randomly initialized network, uniform in `[-1, 1]` per scalar.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::zeroed();
        network.for_each_scalar(|value| *value = rng.random_range(-INIT_SPAN..=INIT_SPAN));
        network
    }

    #[must_use]
    pub(crate) fn from_parts(
        input_weights: [[f32; HIDDEN_COUNT]; INPUT_COUNT],
        output_weights: [[f32; OUTPUT_COUNT]; HIDDEN_COUNT],
        biases: [f32; BIAS_COUNT],
    ) -> Self {
        Self {
            input_weights,
            output_weights,
            biases,
        }
    }

    #[must_use]
    pub(crate) fn input_weights(&self) -> &[[f32; HIDDEN_COUNT]; INPUT_COUNT] {
        &self.input_weights
    }

    #[must_use]
    pub(crate) fn output_weights(&self) -> &[[f32; OUTPUT_COUNT]; HIDDEN_COUNT] {
        &self.output_weights
    }

    #[must_use]
    pub(crate) fn biases(&self) -> &[f32; BIAS_COUNT] {
        &self.biases
    }

    /// Runs the forward pass: ReLU hidden layer, sigmoid output layer.
    ///
    /// Outputs are strictly inside `(0, 1)`; an output above 0.5 fires the
    /// action with the same ordinal.
    #[must_use]
    pub fn predict(&self, inputs: &[f32; INPUT_COUNT]) -> [f32; OUTPUT_COUNT] {
        let mut hidden = [0.0_f32; HIDDEN_COUNT];
        for (j, unit) in hidden.iter_mut().enumerate() {
            let mut sum = self.biases[j];
            for (i, input) in inputs.iter().enumerate() {
                sum += input * self.input_weights[i][j];
            }
            *unit = sum.max(0.0);
        }

        let mut outputs = [0.0_f32; OUTPUT_COUNT];
        for (k, output) in outputs.iter_mut().enumerate() {
            let mut sum = self.biases[HIDDEN_COUNT + k];
            for (j, unit) in hidden.iter().enumerate() {
                sum += unit * self.output_weights[j][k];
            }
            *output = sigmoid(sum);
        }
        outputs
    }

    /// Mutates the network in place.
    ///
    /// Each scalar independently mutates with probability `rate`. A mutating
    /// scalar takes a large jump (`value + U(-2, 2)`) with probability 0.1,
    /// otherwise it drifts by `U(-m, m)` where `m = 0.5 + rate / 2`.
    pub fn mutate<R>(&mut self, rate: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let drift_span = 0.5 + rate / 2.0;
        self.for_each_scalar(|value| {
            if !rng.random_bool(f64::from(rate)) {
                return;
            }
            if rng.random_bool(RESET_CHANCE) {
                *value += rng.random_range(-RESET_SPAN..=RESET_SPAN);
            } else {
                *value += rng.random_range(-drift_span..=drift_span);
            }
        });
    }

    /// Scalar-wise uniform crossover: each position of the child comes from
    /// one parent or the other with equal probability.
    #[must_use]
    pub fn crossover<R>(a: &Self, b: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut child = a.clone();
        let mut other = b.scalars();
        child.for_each_scalar(|value| {
            let theirs = other.next().expect("parents have identical shape");
            if rng.random_bool(0.5) {
                *value = theirs;
            }
        });
        child
    }

    /// Visits every weight and bias in a fixed order: input weights row by
    /// row, output weights row by row, then biases.
    fn for_each_scalar<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut f32),
    {
        for row in &mut self.input_weights {
            row.iter_mut().for_each(&mut f);
        }
        for row in &mut self.output_weights {
            row.iter_mut().for_each(&mut f);
        }
        self.biases.iter_mut().for_each(&mut f);
    }

    /// Iterates scalars in the same order `for_each_scalar` visits them.
    fn scalars(&self) -> impl Iterator<Item = f32> + '_ {
        self.input_weights
            .iter()
            .flatten()
            .chain(self.output_weights.iter().flatten())
            .chain(self.biases.iter())
            .copied()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    #[test]
    fn test_zeroed_network_is_indifferent() {
        let outputs = Network::zeroed().predict(&[0.3; INPUT_COUNT]);
        for output in outputs {
            assert!((output - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_predict_stays_in_open_unit_interval() {
        let mut rng = rng(42);
        for _ in 0..100 {
            let network = Network::random(&mut rng);
            let inputs: [f32; INPUT_COUNT] =
                std::array::from_fn(|_| rng.random_range(-1.0..=1.0));
            for output in network.predict(&inputs) {
                assert!(output > 0.0 && output < 1.0);
            }
        }
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let mut rng = rng(7);
        let original = Network::random(&mut rng);
        let mut mutated = original.clone();
        mutated.mutate(0.0, &mut rng);
        assert_eq!(original, mutated);
    }

    #[test]
    fn test_mutation_rate_one_changes_scalars() {
        let mut rng = rng(7);
        let original = Network::random(&mut rng);
        let mut mutated = original.clone();
        mutated.mutate(1.0, &mut rng);
        let changed = original
            .scalars()
            .zip(mutated.scalars())
            .filter(|(a, b)| a != b)
            .count();
        // All scalars mutate; a zero-width perturbation is measure-zero.
        assert!(changed > (INPUT_COUNT * HIDDEN_COUNT));
    }

    #[test]
    fn test_crossover_takes_every_scalar_from_a_parent() {
        let mut rng = rng(11);
        let a = Network::random(&mut rng);
        let b = Network::random(&mut rng);
        let child = Network::crossover(&a, &b, &mut rng);

        let mut from_a = 0;
        let mut from_b = 0;
        for ((child, a), b) in child.scalars().zip(a.scalars()).zip(b.scalars()) {
            if child == a {
                from_a += 1;
            } else {
                assert_eq!(child, b);
                from_b += 1;
            }
        }
        // Both parents contribute (overwhelmingly likely at 242 scalars).
        assert!(from_a > 0 && from_b > 0);
    }

    #[test]
    fn test_operators_are_reproducible_with_a_seed() {
        let build = || {
            let mut rng = rng(99);
            let mut network = Network::random(&mut rng);
            network.mutate(0.3, &mut rng);
            Network::crossover(&network, &Network::zeroed(), &mut rng)
        };
        assert_eq!(build(), build());
    }
}
