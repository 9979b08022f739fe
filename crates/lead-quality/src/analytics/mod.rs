//! Aggregation library: pure reducers from a lead population to named views.

mod channels;
mod entities;
mod filter;
mod funnel;
mod helpers;
mod summary;
mod timeline;
mod views;

pub use channels::{
    acquisition_economics, campaign_quadrant, channel_metrics, cost_per_lead_by_channel,
    marketing_roi_by_channel, return_on_spend, source_vs_quality, spend_vs_return,
    QuadrantThresholds,
};
pub use entities::{
    industry_performance, partner_scorecards, sales_pipeline, CustomerBook, CustomerRecord,
    PartnerDirectory, PartnerPeriod, PartnerRecord, PipelinePeriod,
};
pub use filter::{
    DisplayAdjuster, DisplayJitter, DisplayOptions, DisplayScale, FilterConfig, FilterError,
    TimePeriod, YearMonth,
};
pub use funnel::funnel_by_quality;
pub use helpers::{percentage, percentage_label, ratio, round_amount, round_to};
pub use summary::{
    feature_importance, high_quality_profile, lead_segmentation, quality_score_distribution,
    score_bin_index, summary_metrics, SCORE_BIN_LABELS,
};
pub use timeline::{
    baseline_score, monthly_trend, quality_heatmap, quality_trend_line, weeks_ago, WEEKDAYS,
};
pub use views::*;

use crate::catalog::CatalogError;
use crate::economics::ChannelEconomics;
use crate::generator::LeadPopulation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of the serialized view contract.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    SummaryMetrics,
    LeadSegmentation,
    QualityScoreDistribution,
    HighQualityProfile,
    FeatureImportance,
    SourceVsQuality,
    FunnelByQuality,
    ChannelMetrics,
    MarketingRoi,
    CostPerLead,
    SpendVsReturn,
    CampaignQuadrant,
    AcquisitionEconomics,
    QualityHeatmap,
    QualityTrendLine,
    MonthlyTrend,
    IndustryPerformance,
    PartnerScorecards,
    SalesPipeline,
}

impl ViewKind {
    pub const fn ordered() -> [Self; 19] {
        [
            Self::SummaryMetrics,
            Self::LeadSegmentation,
            Self::QualityScoreDistribution,
            Self::HighQualityProfile,
            Self::FeatureImportance,
            Self::SourceVsQuality,
            Self::FunnelByQuality,
            Self::ChannelMetrics,
            Self::MarketingRoi,
            Self::CostPerLead,
            Self::SpendVsReturn,
            Self::CampaignQuadrant,
            Self::AcquisitionEconomics,
            Self::QualityHeatmap,
            Self::QualityTrendLine,
            Self::MonthlyTrend,
            Self::IndustryPerformance,
            Self::PartnerScorecards,
            Self::SalesPipeline,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SummaryMetrics => "summary-metrics",
            Self::LeadSegmentation => "lead-segmentation",
            Self::QualityScoreDistribution => "quality-score-distribution",
            Self::HighQualityProfile => "high-quality-profile",
            Self::FeatureImportance => "feature-importance",
            Self::SourceVsQuality => "source-vs-quality",
            Self::FunnelByQuality => "funnel-by-quality",
            Self::ChannelMetrics => "channel-metrics",
            Self::MarketingRoi => "marketing-roi",
            Self::CostPerLead => "cost-per-lead",
            Self::SpendVsReturn => "spend-vs-return",
            Self::CampaignQuadrant => "campaign-quadrant",
            Self::AcquisitionEconomics => "acquisition-economics",
            Self::QualityHeatmap => "quality-heatmap",
            Self::QualityTrendLine => "quality-trend-line",
            Self::MonthlyTrend => "monthly-trend",
            Self::IndustryPerformance => "industry-performance",
            Self::PartnerScorecards => "partner-scorecards",
            Self::SalesPipeline => "sales-pipeline",
        }
    }
}

impl FromStr for ViewKind {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError {
                kind: "view",
                value: raw.to_string(),
            })
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One computed view, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum AnalyticsView {
    SummaryMetrics(SummaryMetrics),
    LeadSegmentation(LeadSegmentation),
    QualityScoreDistribution(Vec<ScoreBin>),
    HighQualityProfile(HighQualityProfile),
    FeatureImportance(Vec<FeatureImportance>),
    SourceVsQuality(Vec<SourceQualityRow>),
    FunnelByQuality(Vec<FunnelQualityRow>),
    ChannelMetrics(Vec<ChannelMetrics>),
    MarketingRoi(Vec<MarketingRoiRow>),
    CostPerLead(Vec<CostPerLeadRow>),
    SpendVsReturn(Vec<SpendReturnRow>),
    CampaignQuadrant(Vec<QuadrantPoint>),
    AcquisitionEconomics(Vec<AcquisitionEconomicsRow>),
    QualityHeatmap(Vec<HeatmapCell>),
    QualityTrendLine(Vec<TrendWeek>),
    MonthlyTrend(Vec<MonthlyTrendRow>),
    IndustryPerformance(Vec<IndustryPerformanceRow>),
    PartnerScorecards(Vec<PartnerScorecard>),
    SalesPipeline(SalesPipeline),
}

impl AnalyticsView {
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::SummaryMetrics(_) => ViewKind::SummaryMetrics,
            Self::LeadSegmentation(_) => ViewKind::LeadSegmentation,
            Self::QualityScoreDistribution(_) => ViewKind::QualityScoreDistribution,
            Self::HighQualityProfile(_) => ViewKind::HighQualityProfile,
            Self::FeatureImportance(_) => ViewKind::FeatureImportance,
            Self::SourceVsQuality(_) => ViewKind::SourceVsQuality,
            Self::FunnelByQuality(_) => ViewKind::FunnelByQuality,
            Self::ChannelMetrics(_) => ViewKind::ChannelMetrics,
            Self::MarketingRoi(_) => ViewKind::MarketingRoi,
            Self::CostPerLead(_) => ViewKind::CostPerLead,
            Self::SpendVsReturn(_) => ViewKind::SpendVsReturn,
            Self::CampaignQuadrant(_) => ViewKind::CampaignQuadrant,
            Self::AcquisitionEconomics(_) => ViewKind::AcquisitionEconomics,
            Self::QualityHeatmap(_) => ViewKind::QualityHeatmap,
            Self::QualityTrendLine(_) => ViewKind::QualityTrendLine,
            Self::MonthlyTrend(_) => ViewKind::MonthlyTrend,
            Self::IndustryPerformance(_) => ViewKind::IndustryPerformance,
            Self::PartnerScorecards(_) => ViewKind::PartnerScorecards,
            Self::SalesPipeline(_) => ViewKind::SalesPipeline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEnvelope {
    pub schema_version: u32,
    #[serde(flatten)]
    pub view: AnalyticsView,
}

impl From<AnalyticsView> for ViewEnvelope {
    fn from(view: AnalyticsView) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            view,
        }
    }
}

/// Everything a reducer may need besides the population itself.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    economics: ChannelEconomics,
    thresholds: QuadrantThresholds,
    partners: PartnerDirectory,
    customers: CustomerBook,
    display: DisplayOptions,
    partner_period: Option<PartnerPeriod>,
    pipeline_period: Option<PipelinePeriod>,
}

impl AnalyticsEngine {
    pub fn new(economics: ChannelEconomics, thresholds: QuadrantThresholds) -> Self {
        Self {
            economics,
            thresholds,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    /// Rescales the partner scorecards by a reporting period instead of the
    /// display multiplier. Jitter still applies.
    pub fn with_partner_period(mut self, period: PartnerPeriod) -> Self {
        self.partner_period = Some(period);
        self
    }

    pub fn with_pipeline_period(mut self, period: PipelinePeriod) -> Self {
        self.pipeline_period = Some(period);
        self
    }

    pub fn with_partners(mut self, partners: PartnerDirectory) -> Self {
        self.partners = partners;
        self
    }

    pub fn with_customers(mut self, customers: CustomerBook) -> Self {
        self.customers = customers;
        self
    }

    pub fn economics(&self) -> &ChannelEconomics {
        &self.economics
    }

    pub fn thresholds(&self) -> &QuadrantThresholds {
        &self.thresholds
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    fn table_display(&self, period_scale: Option<DisplayScale>) -> DisplayOptions {
        DisplayOptions {
            scale: period_scale.unwrap_or(self.display.scale),
            ..self.display
        }
    }

    /// Computes one view. Time-relative views use the snapshot's generation
    /// time, so the same population always yields the same output.
    pub fn compute(&self, kind: ViewKind, population: &LeadPopulation) -> AnalyticsView {
        let leads = population.leads();
        match kind {
            ViewKind::SummaryMetrics => AnalyticsView::SummaryMetrics(summary_metrics(leads)),
            ViewKind::LeadSegmentation => AnalyticsView::LeadSegmentation(lead_segmentation(leads)),
            ViewKind::QualityScoreDistribution => {
                AnalyticsView::QualityScoreDistribution(quality_score_distribution(leads))
            }
            ViewKind::HighQualityProfile => {
                AnalyticsView::HighQualityProfile(high_quality_profile(leads))
            }
            ViewKind::FeatureImportance => AnalyticsView::FeatureImportance(feature_importance()),
            ViewKind::SourceVsQuality => AnalyticsView::SourceVsQuality(source_vs_quality(leads)),
            ViewKind::FunnelByQuality => AnalyticsView::FunnelByQuality(funnel_by_quality(leads)),
            ViewKind::ChannelMetrics => {
                AnalyticsView::ChannelMetrics(channel_metrics(leads, &self.economics))
            }
            ViewKind::MarketingRoi => {
                AnalyticsView::MarketingRoi(marketing_roi_by_channel(leads, &self.economics))
            }
            ViewKind::CostPerLead => AnalyticsView::CostPerLead(cost_per_lead_by_channel(leads)),
            ViewKind::SpendVsReturn => {
                AnalyticsView::SpendVsReturn(spend_vs_return(leads, &self.economics))
            }
            ViewKind::CampaignQuadrant => {
                AnalyticsView::CampaignQuadrant(campaign_quadrant(leads, &self.thresholds))
            }
            ViewKind::AcquisitionEconomics => {
                AnalyticsView::AcquisitionEconomics(acquisition_economics(leads, &self.economics))
            }
            ViewKind::QualityHeatmap => AnalyticsView::QualityHeatmap(quality_heatmap(leads)),
            ViewKind::QualityTrendLine => AnalyticsView::QualityTrendLine(quality_trend_line(
                leads,
                population.generated_at(),
            )),
            ViewKind::MonthlyTrend => {
                AnalyticsView::MonthlyTrend(monthly_trend(leads, &self.economics))
            }
            ViewKind::IndustryPerformance => {
                AnalyticsView::IndustryPerformance(industry_performance(leads))
            }
            ViewKind::PartnerScorecards => {
                let display = self.table_display(self.partner_period.map(PartnerPeriod::scale));
                AnalyticsView::PartnerScorecards(partner_scorecards(&self.partners, &display))
            }
            ViewKind::SalesPipeline => {
                let display = self.table_display(self.pipeline_period.map(PipelinePeriod::scale));
                AnalyticsView::SalesPipeline(sales_pipeline(&self.customers, &display))
            }
        }
    }

    pub fn envelope(&self, kind: ViewKind, population: &LeadPopulation) -> ViewEnvelope {
        self.compute(kind, population).into()
    }

    /// Envelopes for `kinds` in the order given.
    pub fn compute_many(
        &self,
        kinds: &[ViewKind],
        population: &LeadPopulation,
    ) -> Vec<ViewEnvelope> {
        kinds
            .iter()
            .map(|&kind| self.envelope(kind, population))
            .collect()
    }

    pub fn compute_all(&self, population: &LeadPopulation) -> Vec<ViewEnvelope> {
        self.compute_many(&ViewKind::ordered(), population)
    }
}
