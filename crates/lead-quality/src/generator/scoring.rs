use crate::catalog::{LeadSource, QualityTier};
use crate::economics::ChannelEconomics;
use rand::Rng;
use serde::Serialize;

const ENGAGEMENT_WEIGHT: f64 = 0.3;
const FIRM_SIZE_DIVISOR: f64 = 100.0;
const FIRM_SIZE_CAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityAssessment {
    pub score: u8,
    pub tier: QualityTier,
}

/// Combines channel base rate, engagement and firm size into a 0-100 score.
#[derive(Debug, Clone, Copy)]
pub struct QualityScorer<'a> {
    economics: &'a ChannelEconomics,
    noise_amplitude: i32,
}

impl<'a> QualityScorer<'a> {
    pub fn new(economics: &'a ChannelEconomics, noise_amplitude: i32) -> Self {
        Self {
            economics,
            noise_amplitude: noise_amplitude.abs(),
        }
    }

    pub fn assess<R: Rng>(
        &self,
        source: LeadSource,
        engagement_score: u8,
        firm_size: u32,
        rng: &mut R,
    ) -> QualityAssessment {
        let noise = rng.gen_range(-self.noise_amplitude..=self.noise_amplitude);
        self.assess_with_noise(source, engagement_score, firm_size, noise)
    }

    /// Deterministic scoring for a given noise draw.
    ///
    /// The score is rounded before the tier is derived so the stored pair can
    /// never disagree.
    pub fn assess_with_noise(
        &self,
        source: LeadSource,
        engagement_score: u8,
        firm_size: u32,
        noise: i32,
    ) -> QualityAssessment {
        let base = self.economics.profile(source).high_quality_rate * 100.0;
        let engagement_factor = f64::from(engagement_score) * ENGAGEMENT_WEIGHT;
        let firm_size_factor = (f64::from(firm_size) / FIRM_SIZE_DIVISOR).min(FIRM_SIZE_CAP);

        let raw = base + engagement_factor + firm_size_factor + f64::from(noise);
        let score = raw.clamp(0.0, 100.0).round() as u8;

        QualityAssessment {
            score,
            tier: QualityTier::from_score(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn combines_base_rate_engagement_and_firm_size() {
        let economics = ChannelEconomics::standard();
        let scorer = QualityScorer::new(&economics, 15);

        let assessment = scorer.assess_with_noise(LeadSource::GoogleAds, 60, 200, 0);
        assert_eq!(assessment.score, 72);
        assert_eq!(assessment.tier, QualityTier::High);

        let assessment = scorer.assess_with_noise(LeadSource::SocialMedia, 20, 100, -5);
        // 22 + 6 + 1 - 5
        assert_eq!(assessment.score, 24);
        assert_eq!(assessment.tier, QualityTier::Low);
    }

    #[test]
    fn clamps_to_score_bounds() {
        let economics = ChannelEconomics::standard();
        let scorer = QualityScorer::new(&economics, 15);

        let ceiling = scorer.assess_with_noise(LeadSource::Referrals, 100, 500, 15);
        assert_eq!(ceiling.score, 100);
        assert_eq!(ceiling.tier, QualityTier::High);

        let floor = scorer.assess_with_noise(LeadSource::SocialMedia, 0, 5, -40);
        assert_eq!(floor.score, 0);
        assert_eq!(floor.tier, QualityTier::Low);
    }

    #[test]
    fn firm_size_contribution_is_capped() {
        let economics = ChannelEconomics::standard();
        let scorer = QualityScorer::new(&economics, 0);

        let capped = scorer.assess_with_noise(LeadSource::Email, 0, 50_000, 0);
        let at_cap = scorer.assess_with_noise(LeadSource::Email, 0, 2_000, 0);
        assert_eq!(capped.score, at_cap.score);
        assert_eq!(capped.score, 60);
    }

    #[test]
    fn random_noise_stays_within_amplitude() {
        let economics = ChannelEconomics::standard();
        let scorer = QualityScorer::new(&economics, 15);
        let baseline = scorer.assess_with_noise(LeadSource::Seo, 50, 300, 0).score as i32;
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..1_000 {
            let score = scorer.assess(LeadSource::Seo, 50, 300, &mut rng).score as i32;
            assert!((score - baseline).abs() <= 15);
        }
    }
}
