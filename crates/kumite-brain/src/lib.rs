//! Neural controllers for the combat engine: networks, genomes, policies.
//!
//! This crate owns everything between raw perception and a fighter's control
//! signals:
//!
//! - [`network`] - the fixed 9→13→8 feed-forward evaluator and its genetic
//!   operators (uniform mutation with reset jumps, uniform crossover)
//! - [`genome`] - a network plus its per-generation scoring state and
//!   lineage id
//! - [`payload`] - the serialized genome schema with architecture
//!   validation ([`ShapeMismatch`] / [`ParseError`])
//! - [`policy`] - the tagged `Human` / `Neural` / `Script` decision sources
//!   and the [`run_bout`] driver that connects policies to the engine
//!
//! # Shape discipline
//!
//! Inside the process the network shape is carried by the type system —
//! fixed-size arrays make a dimension error unrepresentable. Dimensions only
//! become data at the serialization boundary, and [`payload`] is the single
//! module that validates them.

pub use self::{
    genome::Genome,
    network::Network,
    payload::{
        ARCHITECTURE, Architecture, GenomePayload, ImportError, NetworkPayload, ParseError,
        ShapeMismatch, export_genome, import_genome,
    },
    policy::{Policy, ScriptPolicy, SharedInput, run_bout},
};

pub mod genome;
pub mod network;
pub mod payload;
pub mod policy;
