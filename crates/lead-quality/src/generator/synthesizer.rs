use super::attributes::{AttributeGenerator, GeneratorConfig};
use super::population::LeadPopulation;
use super::scoring::QualityScorer;
use crate::catalog::{Lead, LeadId, LeadStage, QualityTier};
use crate::economics::ChannelEconomics;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Maps tier and engagement to a funnel stage. First matching rule wins.
pub fn stage_for(tier: QualityTier, engagement_score: u8) -> LeadStage {
    match tier {
        QualityTier::High if engagement_score > 80 => LeadStage::Consultation,
        QualityTier::High if engagement_score > 60 => LeadStage::Booking,
        QualityTier::High => LeadStage::Interest,
        QualityTier::Medium if engagement_score > 70 => LeadStage::Booking,
        QualityTier::Medium => LeadStage::Interest,
        QualityTier::Low => LeadStage::Awareness,
    }
}

/// Probability that a lead with `score` converts, after applying `jitter`.
pub fn conversion_chance(score: u8, jitter: f64) -> f64 {
    (f64::from(score) / 100.0 + jitter).clamp(0.0, 1.0)
}

/// Assembles complete lead records from drawn attributes and channel economics.
#[derive(Debug, Clone, Default)]
pub struct LeadSynthesizer {
    economics: ChannelEconomics,
    config: GeneratorConfig,
}

impl LeadSynthesizer {
    pub fn new(economics: ChannelEconomics, config: GeneratorConfig) -> Self {
        Self { economics, config }
    }

    pub fn economics(&self) -> &ChannelEconomics {
        &self.economics
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds the lead with 1-based `ordinal`.
    pub fn synthesize_one<R: Rng>(&self, ordinal: usize, now: DateTime<Utc>, rng: &mut R) -> Lead {
        let attributes = AttributeGenerator::new(&self.config);
        let scorer = QualityScorer::new(&self.economics, self.config.score_noise);

        let source = attributes.draw_source(rng);
        let drawn = attributes.draw(source, now, rng);
        let assessment = scorer.assess(source, drawn.engagement_score, drawn.firm_size, rng);

        let jitter_bound = self.config.conversion_jitter.abs();
        let jitter = if jitter_bound > 0.0 {
            rng.gen_range(-jitter_bound..jitter_bound)
        } else {
            0.0
        };
        let converted = rng.gen::<f64>() < conversion_chance(assessment.score, jitter);

        let cost_jitter = self.config.cost_jitter.abs();
        let base_cost = i64::from(self.economics.profile(source).cost_per_lead);
        let cost_per_lead = (base_cost + rng.gen_range(-cost_jitter..=cost_jitter)).max(0) as u32;

        Lead {
            id: LeadId::sequential(ordinal),
            source,
            date_created: drawn.date_created,
            firm_size: drawn.firm_size,
            industry: drawn.industry,
            revenue_potential: drawn.revenue_potential,
            quality_score: assessment.score,
            quality_tier: assessment.tier,
            engagement_score: drawn.engagement_score,
            stage: stage_for(assessment.tier, drawn.engagement_score),
            days_in_funnel: drawn.days_in_funnel,
            converted,
            cost_per_lead,
            communication_preference: drawn.communication_preference,
        }
    }

    /// Produces `count` independent leads with ids `LEAD-00001` onwards.
    pub fn synthesize<R: Rng>(&self, count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<Lead> {
        (1..=count)
            .map(|ordinal| self.synthesize_one(ordinal, now, rng))
            .collect()
    }

    /// Generates a population snapshot as of `now`.
    ///
    /// With a seed the output is reproducible for the same `now`; without one
    /// the generator is seeded from OS entropy.
    pub fn generate_at(&self, count: usize, seed: Option<u64>, now: DateTime<Utc>) -> LeadPopulation {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let leads = self.synthesize(count, now, &mut rng);

        let high = leads.iter().filter(|lead| lead.is_high_quality()).count();
        debug!(
            count,
            seeded = seed.is_some(),
            high_quality = high,
            "synthesized lead population"
        );

        LeadPopulation::new(now, seed, leads)
    }

    pub fn generate(&self, count: usize, seed: Option<u64>) -> LeadPopulation {
        self.generate_at(count, seed, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LeadSource;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn stage_rules_follow_decision_table() {
        assert_eq!(stage_for(QualityTier::High, 81), LeadStage::Consultation);
        assert_eq!(stage_for(QualityTier::High, 80), LeadStage::Booking);
        assert_eq!(stage_for(QualityTier::High, 61), LeadStage::Booking);
        assert_eq!(stage_for(QualityTier::High, 60), LeadStage::Interest);
        assert_eq!(stage_for(QualityTier::Medium, 71), LeadStage::Booking);
        assert_eq!(stage_for(QualityTier::Medium, 70), LeadStage::Interest);
        assert_eq!(stage_for(QualityTier::Low, 100), LeadStage::Awareness);
    }

    #[test]
    fn conversion_chance_is_clamped() {
        assert_eq!(conversion_chance(100, 0.2), 1.0);
        assert_eq!(conversion_chance(0, -0.2), 0.0);
        assert!((conversion_chance(50, 0.1) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let synthesizer = LeadSynthesizer::default();
        let population = synthesizer.generate_at(3, Some(1), now());
        let ids: Vec<_> = population.leads().iter().map(|lead| lead.id.0.as_str()).collect();
        assert_eq!(ids, vec!["LEAD-00001", "LEAD-00002", "LEAD-00003"]);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let synthesizer = LeadSynthesizer::default();
        let first = synthesizer.generate_at(50, Some(2024), now());
        let second = synthesizer.generate_at(50, Some(2024), now());
        assert_eq!(first, second);
        assert_eq!(first.seed(), Some(2024));
    }

    #[test]
    fn cost_tracks_channel_base_with_jitter() {
        let synthesizer = LeadSynthesizer::default();
        let population = synthesizer.generate_at(500, Some(8), now());

        for lead in population.leads() {
            let base = i64::from(synthesizer.economics().profile(lead.source).cost_per_lead);
            assert!((i64::from(lead.cost_per_lead) - base).abs() <= 10);
        }
    }

    #[test]
    fn derived_fields_are_consistent() {
        let synthesizer = LeadSynthesizer::default();
        let population = synthesizer.generate_at(1_000, Some(77), now());

        for lead in population.leads() {
            assert_eq!(lead.quality_tier, QualityTier::from_score(lead.quality_score));
            assert_eq!(lead.stage, stage_for(lead.quality_tier, lead.engagement_score));
            assert_ne!(lead.stage, LeadStage::Conversion);
        }
    }

    #[test]
    fn zero_jitter_config_is_accepted() {
        let config = GeneratorConfig {
            conversion_jitter: 0.0,
            cost_jitter: 0,
            score_noise: 0,
            ..GeneratorConfig::default()
        };
        let synthesizer = LeadSynthesizer::new(ChannelEconomics::standard(), config);
        let population = synthesizer.generate_at(100, Some(4), now());

        for lead in population.leads() {
            let base = synthesizer.economics().profile(lead.source).cost_per_lead;
            assert_eq!(lead.cost_per_lead, base);
        }
        assert!(population
            .leads()
            .iter()
            .all(|lead| LeadSource::ordered().contains(&lead.source)));
    }
}
