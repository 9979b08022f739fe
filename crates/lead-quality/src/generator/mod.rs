//! Synthesis of lead populations with correlated attributes.

mod attributes;
mod population;
mod scoring;
pub mod snapshot;
mod synthesizer;

pub use attributes::{AttributeGenerator, GeneratorConfig, LeadAttributes};
pub use population::LeadPopulation;
pub use scoring::{QualityAssessment, QualityScorer};
pub use snapshot::SnapshotError;
pub use synthesizer::{conversion_chance, stage_for, LeadSynthesizer};

/// Entropy-seeded population using the standard channel economics.
pub fn generate_population(count: usize) -> LeadPopulation {
    LeadSynthesizer::default().generate(count, None)
}

/// Reproducible population using the standard channel economics.
pub fn generate_population_seeded(count: usize, seed: u64) -> LeadPopulation {
    LeadSynthesizer::default().generate(count, Some(seed))
}
