//! Output records for every reducer. Field names are the presentation contract.

use crate::catalog::{CommunicationPreference, Industry, Lead, LeadSource, LeadStage, QualityTier};
use serde::Serialize;

/// Per-tier lead counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "Low")]
    pub low: usize,
}

impl TierCounts {
    pub fn tally<'a, I>(leads: I) -> Self
    where
        I: IntoIterator<Item = &'a Lead>,
    {
        let mut counts = Self::default();
        for lead in leads {
            counts.record(lead.quality_tier);
        }
        counts
    }

    pub fn record(&mut self, tier: QualityTier) {
        match tier {
            QualityTier::High => self.high += 1,
            QualityTier::Medium => self.medium += 1,
            QualityTier::Low => self.low += 1,
        }
    }

    pub fn get(&self, tier: QualityTier) -> usize {
        match tier {
            QualityTier::High => self.high,
            QualityTier::Medium => self.medium,
            QualityTier::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBin {
    pub range: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierShare {
    pub count: usize,
    /// One-decimal percentage of the population; shares are rounded
    /// independently and are not renormalized to sum to 100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSegmentation {
    pub high: TierShare,
    pub medium: TierShare,
    pub low: TierShare,
    pub total: usize,
}

impl LeadSegmentation {
    pub fn share(&self, tier: QualityTier) -> &TierShare {
        match tier {
            QualityTier::High => &self.high,
            QualityTier::Medium => &self.medium,
            QualityTier::Low => &self.low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_leads: usize,
    pub high_quality_leads: usize,
    pub medium_quality_leads: usize,
    pub low_quality_leads: usize,
    pub high_quality_percentage: f64,
    pub medium_quality_percentage: f64,
    pub low_quality_percentage: f64,
    pub avg_quality_score: u8,
    pub conversion_rate: f64,
    pub high_quality_conversion_rate: f64,
    pub cost_per_high_quality_lead: u64,
    pub predicted_conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighQualityProfile {
    pub sample_size: usize,
    pub avg_firm_size: u32,
    pub most_common_industry: Industry,
    pub avg_engagement_score: u8,
    pub top_communication_channel: CommunicationPreference,
    pub avg_days_in_funnel: u16,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceQualityRow {
    pub channel: LeadSource,
    #[serde(flatten)]
    pub counts: TierCounts,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelQualityRow {
    pub stage: LeadStage,
    #[serde(flatten)]
    pub counts: TierCounts,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetrics {
    pub channel: LeadSource,
    pub volume: usize,
    pub high_quality_count: usize,
    pub high_quality_percentage: f64,
    pub cost_per_high_quality_lead: f64,
    pub conversion_rate: f64,
    pub converted_count: usize,
    pub revenue: u64,
    pub monthly_spend: u64,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingRoiRow {
    pub channel: LeadSource,
    pub monthly_spend: u64,
    pub spend: u64,
    pub revenue: u64,
    pub roi: i64,
    pub cost_per_high_quality_lead: u64,
    pub conversion_rate: f64,
    pub lead_volume: usize,
    pub high_quality_leads: usize,
    pub converted_leads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPerLeadRow {
    pub channel: LeadSource,
    pub cost_per_lead_all: u64,
    #[serde(rename = "costPerLeadHQ")]
    pub cost_per_lead_hq: u64,
    /// High-quality share as a one-decimal percentage string.
    pub efficiency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendReturnRow {
    pub channel: LeadSource,
    pub spend: u64,
    #[serde(rename = "return")]
    pub returned: u64,
    pub high_quality_leads: usize,
    pub profitability: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignQuadrant {
    Winners,
    Watch,
    Nurture,
    Losers,
}

impl CampaignQuadrant {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Winners => "Winners",
            Self::Watch => "Watch",
            Self::Nurture => "Nurture",
            Self::Losers => "Losers",
        }
    }
}

/// Bubble-chart point: x = cost per HQ lead, y = conversion rate, size = volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantPoint {
    pub channel: LeadSource,
    pub x: u64,
    pub y: f64,
    pub size: usize,
    pub value: usize,
    pub quadrant: CampaignQuadrant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub day: &'static str,
    pub hour: String,
    pub score: u8,
    /// Number of leads behind the cell; zero means the baseline was used.
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendWeek {
    pub week: String,
    #[serde(flatten)]
    pub counts: TierCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendRow {
    pub month: String,
    pub spend: u64,
    pub leads: usize,
    pub high_quality_leads: usize,
    pub revenue: u64,
    pub conversion_rate: i64,
    pub roi: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionEconomicsRow {
    pub channel: LeadSource,
    pub spend: u64,
    pub customers: usize,
    pub revenue: u64,
    pub cac: u64,
    pub ltv: u64,
    pub ltv_cac: f64,
    pub roas: f64,
    pub payback_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryPerformanceRow {
    pub industry: Industry,
    pub volume: usize,
    pub high_quality_percentage: f64,
    pub conversion_rate: f64,
    pub revenue: u64,
    pub avg_revenue_potential: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerScorecard {
    pub partner: &'static str,
    pub partner_revenue: u64,
    pub new_client_revenue: u64,
    pub matter_profit: u64,
    pub matter_margin: u8,
    pub realisation: u8,
    pub collection: u8,
    pub leverage: f64,
    pub utilisation: u8,
    pub retention: u8,
    pub net_growth: u8,
    pub concentration_top3: u8,
    pub win_rate: u8,
    pub new_clients: u64,
    pub new_matters: u64,
    pub bd_pipeline_value: u64,
    pub profit_margin: f64,
    pub revenue_per_new_client: u64,
    pub pipeline_coverage: f64,
    pub trend_revenue: Vec<u64>,
    pub trend_profit: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCustomer {
    pub name: &'static str,
    pub revenue: u64,
    pub revenue_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPipeline {
    pub customers: Vec<PipelineCustomer>,
    pub total_revenue: u64,
    pub customer_count: usize,
    pub products_sold: u64,
    pub average_revenue_per_customer: u64,
}
