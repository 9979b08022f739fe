use super::views::{FunnelQualityRow, TierCounts};
use crate::catalog::{Lead, LeadStage};

/// Tier counts per funnel stage, in canonical funnel order.
pub fn funnel_by_quality(leads: &[Lead]) -> Vec<FunnelQualityRow> {
    let mut stages = [TierCounts::default(); LeadStage::COUNT];
    for lead in leads {
        stages[lead.stage.index()].record(lead.quality_tier);
    }

    LeadStage::ordered()
        .into_iter()
        .zip(stages)
        .map(|(stage, counts)| FunnelQualityRow {
            stage,
            counts,
            total: counts.total(),
        })
        .collect()
}
