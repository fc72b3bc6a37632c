//! The serialized genome payload and its validation.
//!
//! The payload is the only place networks cross a serialization boundary
//! (export files, UI transfers, imports from other installations). Inside
//! the process networks are fixed-size arrays and shape errors cannot exist;
//! here dimensions arrive as untrusted data and are validated explicitly.
//!
//! Import is two-staged and each stage has its own error: malformed JSON is
//! a [`ParseError`], well-formed JSON whose dimensions disagree with the
//! compiled-in `(9, 13, 8)` architecture is a [`ShapeMismatch`] carrying
//! both shapes. Neither is recovered automatically; the caller decides.

use serde::{Deserialize, Serialize};

use crate::{
    genome::Genome,
    network::{BIAS_COUNT, HIDDEN_COUNT, INPUT_COUNT, Network, OUTPUT_COUNT},
};

/// The compiled-in `(input, hidden, output)` shape.
pub const ARCHITECTURE: (usize, usize, usize) = (INPUT_COUNT, HIDDEN_COUNT, OUTPUT_COUNT);

/// A payload's dimensions differ from the compiled-in architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("network shape {actual:?} differs from compiled-in {expected:?}")]
pub struct ShapeMismatch {
    pub expected: (usize, usize, usize),
    pub actual: (usize, usize, usize),
}

/// A payload that is not valid JSON for the genome schema.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("malformed genome payload: {source}")]
pub struct ParseError {
    source: serde_json::Error,
}

/// Everything that can go wrong importing a serialized genome.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ImportError {
    #[display("{_0}")]
    Parse(ParseError),
    #[display("{_0}")]
    Shape(ShapeMismatch),
}

/// Architecture metadata carried alongside the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl Architecture {
    #[must_use]
    pub fn compiled_in() -> Self {
        let (input, hidden, output) = ARCHITECTURE;
        Self {
            input,
            hidden,
            output,
        }
    }

    fn as_tuple(self) -> (usize, usize, usize) {
        (self.input, self.hidden, self.output)
    }
}

/// Network weights in transport form. Dimensions are data, not types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPayload {
    pub input_weights: Vec<Vec<f32>>,
    pub output_weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

impl NetworkPayload {
    #[must_use]
    pub fn from_network(network: &Network) -> Self {
        Self {
            input_weights: network.input_weights().iter().map(|r| r.to_vec()).collect(),
            output_weights: network
                .output_weights()
                .iter()
                .map(|r| r.to_vec())
                .collect(),
            biases: network.biases().to_vec(),
        }
    }

    /// Validates dimensions and rebuilds the fixed-shape network.
    pub fn to_network(&self) -> Result<Network, ShapeMismatch> {
        let mismatch = ShapeMismatch {
            expected: ARCHITECTURE,
            actual: self.observed_shape(),
        };

        let rows_ok = self.input_weights.len() == INPUT_COUNT
            && self.input_weights.iter().all(|r| r.len() == HIDDEN_COUNT)
            && self.output_weights.len() == HIDDEN_COUNT
            && self.output_weights.iter().all(|r| r.len() == OUTPUT_COUNT)
            && self.biases.len() == BIAS_COUNT;
        if !rows_ok {
            return Err(mismatch);
        }

        let mut input_weights = [[0.0; HIDDEN_COUNT]; INPUT_COUNT];
        for (row, values) in input_weights.iter_mut().zip(&self.input_weights) {
            row.copy_from_slice(values);
        }
        let mut output_weights = [[0.0; OUTPUT_COUNT]; HIDDEN_COUNT];
        for (row, values) in output_weights.iter_mut().zip(&self.output_weights) {
            row.copy_from_slice(values);
        }
        let mut biases = [0.0; BIAS_COUNT];
        biases.copy_from_slice(&self.biases);

        Ok(Network::from_parts(input_weights, output_weights, biases))
    }

    /// The shape this payload appears to have, for error reporting.
    fn observed_shape(&self) -> (usize, usize, usize) {
        let hidden = self
            .input_weights
            .first()
            .map_or(self.output_weights.len(), Vec::len);
        let output = self
            .output_weights
            .first()
            .map_or(OUTPUT_COUNT, Vec::len);
        (self.input_weights.len(), hidden, output)
    }
}

/// The full serialized genome: scoring state, weights, and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomePayload {
    pub id: String,
    pub fitness: f32,
    pub matches_won: u32,
    /// Generation the genome was exported from (metadata only).
    pub generation: u32,
    pub network: NetworkPayload,
    pub architecture: Architecture,
}

impl GenomePayload {
    #[must_use]
    pub fn from_genome(genome: &Genome, generation: u32) -> Self {
        Self {
            id: genome.id().to_owned(),
            fitness: genome.fitness(),
            matches_won: genome.matches_won(),
            generation,
            network: NetworkPayload::from_network(genome.network()),
            architecture: Architecture::compiled_in(),
        }
    }

    /// Validates the payload and rebuilds the genome.
    ///
    /// The declared architecture is checked before the weight dimensions so
    /// an honest payload from a differently-shaped build fails with both
    /// shapes reported, not with a confusing row-length mismatch.
    pub fn to_genome(&self) -> Result<Genome, ShapeMismatch> {
        if self.architecture.as_tuple() != ARCHITECTURE {
            return Err(ShapeMismatch {
                expected: ARCHITECTURE,
                actual: self.architecture.as_tuple(),
            });
        }
        let network = self.network.to_network()?;
        Ok(Genome::new(self.id.clone(), network))
    }
}

/// Parses and validates a serialized genome payload.
pub fn import_genome(json: &str) -> Result<Genome, ImportError> {
    let payload: GenomePayload =
        serde_json::from_str(json).map_err(|source| ImportError::Parse(ParseError { source }))?;
    payload.to_genome().map_err(ImportError::Shape)
}

/// Serializes a genome to the transport payload.
#[must_use]
pub fn export_genome(genome: &Genome, generation: u32) -> GenomePayload {
    GenomePayload::from_genome(genome, generation)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn sample_genome() -> Genome {
        let mut rng = Pcg32::seed_from_u64(42);
        Genome::new(Genome::lineage_id(5, 3), Network::random(&mut rng))
    }

    #[test]
    fn test_roundtrip_is_identity() {
        let genome = sample_genome();
        let json = serde_json::to_string(&export_genome(&genome, 5)).unwrap();
        let back = import_genome(&json).unwrap();
        assert_eq!(back.id(), genome.id());
        assert_eq!(back.network(), genome.network());
    }

    #[test]
    fn test_import_resets_score() {
        let mut genome = sample_genome();
        genome.add_fitness(12.0);
        genome.record_win();
        let json = serde_json::to_string(&export_genome(&genome, 5)).unwrap();
        let back = import_genome(&json).unwrap();
        assert_eq!(back.fitness(), 0.0);
        assert_eq!(back.matches_won(), 0);
    }

    #[test]
    fn test_short_input_matrix_is_a_shape_mismatch() {
        let mut payload = export_genome(&sample_genome(), 0);
        payload.network.input_weights.pop();
        let err = payload.to_genome().unwrap_err();
        assert_eq!(
            err,
            ShapeMismatch {
                expected: (9, 13, 8),
                actual: (8, 13, 8),
            }
        );
    }

    #[test]
    fn test_foreign_architecture_is_a_shape_mismatch() {
        let mut payload = export_genome(&sample_genome(), 0);
        payload.architecture.hidden = 21;
        let err = payload.to_genome().unwrap_err();
        assert_eq!(err.actual, (9, 21, 8));
        assert_eq!(err.expected, ARCHITECTURE);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = import_genome("{not json").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn test_wrong_bias_count_is_a_shape_mismatch() {
        let mut payload = export_genome(&sample_genome(), 0);
        payload.network.biases.push(0.0);
        assert!(matches!(
            import_genome(&serde_json::to_string(&payload).unwrap()),
            Err(ImportError::Shape(_))
        ));
    }
}
