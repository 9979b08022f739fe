use crate::catalog::{CommunicationPreference, Industry, LeadSource};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::ops::RangeInclusive;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Distribution bounds used when synthesizing leads.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub engagement_score: RangeInclusive<u8>,
    pub firm_size: RangeInclusive<u32>,
    pub revenue_potential: RangeInclusive<u64>,
    pub days_in_funnel: RangeInclusive<u16>,
    /// Width of the trailing creation-date window.
    pub lookback_days: u32,
    /// Symmetric integer noise added to the quality score.
    pub score_noise: i32,
    /// Symmetric integer jitter added to the channel cost per lead.
    pub cost_jitter: i64,
    /// Symmetric jitter added to the conversion chance.
    pub conversion_jitter: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            engagement_score: 0..=100,
            firm_size: 5..=500,
            revenue_potential: 50_000..=500_000,
            days_in_funnel: 1..=180,
            lookback_days: 365,
            score_noise: 15,
            cost_jitter: 10,
            conversion_jitter: 0.2,
        }
    }
}

/// Independent attributes drawn for one lead before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadAttributes {
    pub source: LeadSource,
    pub engagement_score: u8,
    pub firm_size: u32,
    pub date_created: DateTime<Utc>,
    pub industry: Industry,
    pub revenue_potential: u64,
    pub days_in_funnel: u16,
    pub communication_preference: CommunicationPreference,
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> AttributeGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn draw_source<R: Rng>(&self, rng: &mut R) -> LeadSource {
        LeadSource::ordered()[rng.gen_range(0..LeadSource::COUNT)]
    }

    pub fn draw<R: Rng>(
        &self,
        source: LeadSource,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> LeadAttributes {
        let engagement_score = rng.gen_range(self.config.engagement_score.clone());
        let firm_size = rng.gen_range(self.config.firm_size.clone());
        let date_created = self.draw_date(now, rng);
        let days_in_funnel = rng.gen_range(self.config.days_in_funnel.clone());
        let industry = Industry::ordered()[rng.gen_range(0..Industry::COUNT)];
        let revenue_potential = rng.gen_range(self.config.revenue_potential.clone());
        let communication_preference =
            CommunicationPreference::ordered()[rng.gen_range(0..CommunicationPreference::COUNT)];

        LeadAttributes {
            source,
            engagement_score,
            firm_size,
            date_created,
            industry,
            revenue_potential,
            days_in_funnel,
            communication_preference,
        }
    }

    /// Uniform instant within the lookback window ending at `now`.
    pub fn draw_date<R: Rng>(&self, now: DateTime<Utc>, rng: &mut R) -> DateTime<Utc> {
        let window = i64::from(self.config.lookback_days) * MILLIS_PER_DAY;
        let offset = rng.gen_range(0..=window);
        now - Duration::milliseconds(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn draws_stay_within_configured_bounds() {
        let config = GeneratorConfig::default();
        let generator = AttributeGenerator::new(&config);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..2_000 {
            let source = generator.draw_source(&mut rng);
            let attributes = generator.draw(source, now(), &mut rng);
            assert_eq!(attributes.source, source);
            assert!(attributes.engagement_score <= 100);
            assert!((5..=500).contains(&attributes.firm_size));
            assert!((50_000..=500_000).contains(&attributes.revenue_potential));
            assert!((1..=180).contains(&attributes.days_in_funnel));
            assert!(attributes.date_created <= now());
            assert!(attributes.date_created >= now() - Duration::days(365));
        }
    }

    #[test]
    fn every_channel_is_reachable() {
        let config = GeneratorConfig::default();
        let generator = AttributeGenerator::new(&config);
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; LeadSource::COUNT];

        for _ in 0..500 {
            seen[generator.draw_source(&mut rng).index()] = true;
        }

        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn narrowed_ranges_pin_the_draw() {
        let config = GeneratorConfig {
            engagement_score: 42..=42,
            firm_size: 100..=100,
            lookback_days: 0,
            ..GeneratorConfig::default()
        };
        let generator = AttributeGenerator::new(&config);
        let mut rng = StdRng::seed_from_u64(5);

        let attributes = generator.draw(LeadSource::Email, now(), &mut rng);
        assert_eq!(attributes.engagement_score, 42);
        assert_eq!(attributes.firm_size, 100);
        assert_eq!(attributes.date_created, now());
    }
}
