use super::helpers::{mode_index, percentage, ratio, round_amount, round_to};
use super::views::{
    FeatureImportance, HighQualityProfile, LeadSegmentation, ScoreBin, SummaryMetrics, TierCounts,
    TierShare,
};
use crate::catalog::{CommunicationPreference, Industry, Lead, QualityTier};

pub const SCORE_BIN_LABELS: [&str; 10] = [
    "0-10", "11-20", "21-30", "31-40", "41-50", "51-60", "61-70", "71-80", "81-90", "91-100",
];

/// Share of the high-tier conversion rate expected to hold going forward.
const PREDICTED_CONVERSION_FACTOR: f64 = 0.98;

const FEATURE_WEIGHTS: [(&str, u8); 5] = [
    ("Firm Size", 28),
    ("Engagement Level", 24),
    ("Lead Source", 20),
    ("Industry", 16),
    ("Communication Preference", 12),
];

/// Bin index matching [`SCORE_BIN_LABELS`]: 0..=10 share the first bin, 100
/// lands in the last one.
pub fn score_bin_index(score: u8) -> usize {
    if score == 0 {
        0
    } else {
        ((usize::from(score) - 1) / 10).min(SCORE_BIN_LABELS.len() - 1)
    }
}

pub fn quality_score_distribution(leads: &[Lead]) -> Vec<ScoreBin> {
    let mut counts = [0usize; SCORE_BIN_LABELS.len()];
    for lead in leads {
        counts[score_bin_index(lead.quality_score)] += 1;
    }

    SCORE_BIN_LABELS
        .into_iter()
        .zip(counts)
        .map(|(range, count)| ScoreBin { range, count })
        .collect()
}

pub fn lead_segmentation(leads: &[Lead]) -> LeadSegmentation {
    let counts = TierCounts::tally(leads);
    let total = leads.len();
    let share = |tier: QualityTier| {
        let count = counts.get(tier);
        TierShare {
            count,
            percentage: round_to(percentage(count, total), 1),
        }
    };

    LeadSegmentation {
        high: share(QualityTier::High),
        medium: share(QualityTier::Medium),
        low: share(QualityTier::Low),
        total,
    }
}

pub fn summary_metrics(leads: &[Lead]) -> SummaryMetrics {
    let total = leads.len();
    let counts = TierCounts::tally(leads);

    let score_sum: u64 = leads.iter().map(|lead| u64::from(lead.quality_score)).sum();
    let total_cost: u64 = leads.iter().map(|lead| u64::from(lead.cost_per_lead)).sum();
    let converted = leads.iter().filter(|lead| lead.converted).count();
    let high_converted = leads
        .iter()
        .filter(|lead| lead.is_high_quality() && lead.converted)
        .count();

    let high_conversion = percentage(high_converted, counts.high);

    SummaryMetrics {
        total_leads: total,
        high_quality_leads: counts.high,
        medium_quality_leads: counts.medium,
        low_quality_leads: counts.low,
        high_quality_percentage: round_to(percentage(counts.high, total), 1),
        medium_quality_percentage: round_to(percentage(counts.medium, total), 1),
        low_quality_percentage: round_to(percentage(counts.low, total), 1),
        avg_quality_score: ratio(score_sum as f64, total as f64).round() as u8,
        conversion_rate: round_to(percentage(converted, total), 1),
        high_quality_conversion_rate: round_to(high_conversion, 1),
        cost_per_high_quality_lead: round_amount(ratio(total_cost as f64, counts.high as f64)),
        predicted_conversion_rate: round_to(high_conversion * PREDICTED_CONVERSION_FACTOR, 1),
    }
}

/// Typical attributes of High-tier leads. With no High leads the numeric
/// fields are zero and the categorical ones fall back to the first
/// enumerated value.
pub fn high_quality_profile(leads: &[Lead]) -> HighQualityProfile {
    let mut sample_size = 0usize;
    let mut firm_size = 0u64;
    let mut engagement = 0u64;
    let mut days = 0u64;
    let mut converted = 0usize;
    let mut industries = [0usize; Industry::COUNT];
    let mut preferences = [0usize; CommunicationPreference::COUNT];

    for lead in leads.iter().filter(|lead| lead.is_high_quality()) {
        sample_size += 1;
        firm_size += u64::from(lead.firm_size);
        engagement += u64::from(lead.engagement_score);
        days += u64::from(lead.days_in_funnel);
        if lead.converted {
            converted += 1;
        }
        industries[lead.industry.index()] += 1;
        preferences[lead.communication_preference.index()] += 1;
    }

    let average = |sum: u64| ratio(sum as f64, sample_size as f64).round();
    let most_common_industry = mode_index(&industries)
        .map(|index| Industry::ordered()[index])
        .unwrap_or(Industry::CorporateLaw);
    let top_communication_channel = mode_index(&preferences)
        .map(|index| CommunicationPreference::ordered()[index])
        .unwrap_or(CommunicationPreference::Email);

    HighQualityProfile {
        sample_size,
        avg_firm_size: average(firm_size) as u32,
        most_common_industry,
        avg_engagement_score: average(engagement) as u8,
        top_communication_channel,
        avg_days_in_funnel: average(days) as u16,
        conversion_rate: round_to(percentage(converted, sample_size), 1),
    }
}

pub fn feature_importance() -> Vec<FeatureImportance> {
    FEATURE_WEIGHTS
        .into_iter()
        .map(|(feature, importance)| FeatureImportance {
            feature,
            importance,
        })
        .collect()
}
