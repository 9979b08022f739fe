//! Synthetic lead generation, quality scoring and marketing analytics.
//!
//! [`generator`] produces immutable [`LeadPopulation`] snapshots and
//! [`analytics`] reduces them into named, versioned views.

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod economics;
pub mod error;
pub mod generator;
pub mod telemetry;

pub use analytics::{AnalyticsEngine, AnalyticsView, FilterConfig, ViewEnvelope, ViewKind};
pub use catalog::{Lead, LeadSource, QualityTier};
pub use economics::ChannelEconomics;
pub use generator::{generate_population, generate_population_seeded, LeadPopulation};
