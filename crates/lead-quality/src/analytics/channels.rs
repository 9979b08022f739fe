//! Per-channel reducers. Every row set covers the full channel enumeration,
//! so a channel without leads still reports zeroed figures.

use super::helpers::{percentage, percentage_label, ratio, round_amount, round_to};
use super::views::{
    AcquisitionEconomicsRow, CampaignQuadrant, ChannelMetrics, CostPerLeadRow, MarketingRoiRow,
    QuadrantPoint, SourceQualityRow, SpendReturnRow, TierCounts,
};
use crate::catalog::{Lead, LeadSource};
use crate::economics::ChannelEconomics;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Boundaries of the campaign quadrant chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantThresholds {
    /// Conversion rate (percent) at or above which a channel converts well.
    pub min_conversion_rate: f64,
    /// Cost per high-quality lead at or below which a channel is efficient.
    pub max_cost_per_high_quality_lead: f64,
}

impl Default for QuadrantThresholds {
    fn default() -> Self {
        Self {
            min_conversion_rate: 8.0,
            max_cost_per_high_quality_lead: 100.0,
        }
    }
}

impl QuadrantThresholds {
    pub fn classify(
        &self,
        cost_per_high_quality_lead: f64,
        conversion_rate: f64,
    ) -> CampaignQuadrant {
        let converts = conversion_rate >= self.min_conversion_rate;
        let efficient = cost_per_high_quality_lead <= self.max_cost_per_high_quality_lead;
        match (converts, efficient) {
            (true, true) => CampaignQuadrant::Winners,
            (true, false) => CampaignQuadrant::Watch,
            (false, true) => CampaignQuadrant::Nurture,
            (false, false) => CampaignQuadrant::Losers,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelTally {
    volume: usize,
    tiers: TierCounts,
    converted: usize,
    total_cost: u64,
    revenue: u64,
}

impl ChannelTally {
    fn conversion_rate(&self) -> f64 {
        percentage(self.converted, self.volume)
    }

    fn cost_per_high_quality_lead(&self) -> f64 {
        ratio(self.total_cost as f64, self.tiers.high as f64)
    }
}

fn tally_channels(leads: &[Lead]) -> [ChannelTally; LeadSource::COUNT] {
    let mut tallies = [ChannelTally::default(); LeadSource::COUNT];
    for lead in leads {
        let tally = &mut tallies[lead.source.index()];
        tally.volume += 1;
        tally.tiers.record(lead.quality_tier);
        tally.total_cost += u64::from(lead.cost_per_lead);
        if lead.converted {
            tally.converted += 1;
            tally.revenue += lead.revenue_potential;
        }
    }
    tallies
}

fn channels_with_tallies(leads: &[Lead]) -> impl Iterator<Item = (LeadSource, ChannelTally)> {
    LeadSource::ordered().into_iter().zip(tally_channels(leads))
}

/// `(revenue - spend) / spend * 100`, zero when there is no spend.
pub fn return_on_spend(revenue: u64, spend: u64) -> f64 {
    ratio(revenue as f64 - spend as f64, spend as f64) * 100.0
}

pub fn source_vs_quality(leads: &[Lead]) -> Vec<SourceQualityRow> {
    channels_with_tallies(leads)
        .map(|(channel, tally)| SourceQualityRow {
            channel,
            counts: tally.tiers,
            total: tally.volume,
        })
        .collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn channel_metrics(leads: &[Lead], economics: &ChannelEconomics) -> Vec<ChannelMetrics> {
    let mut rows: Vec<ChannelMetrics> = channels_with_tallies(leads)
        .map(|(channel, tally)| {
            let monthly_spend = economics.profile(channel).monthly_spend;
            ChannelMetrics {
                channel,
                volume: tally.volume,
                high_quality_count: tally.tiers.high,
                high_quality_percentage: percentage(tally.tiers.high, tally.volume),
                cost_per_high_quality_lead: tally.cost_per_high_quality_lead(),
                conversion_rate: tally.conversion_rate(),
                converted_count: tally.converted,
                revenue: tally.revenue,
                monthly_spend,
                roi: return_on_spend(tally.revenue, monthly_spend),
            }
        })
        .collect();

    rows.sort_by(|a, b| descending(a.roi, b.roi));
    rows
}

pub fn marketing_roi_by_channel(
    leads: &[Lead],
    economics: &ChannelEconomics,
) -> Vec<MarketingRoiRow> {
    let mut rows: Vec<MarketingRoiRow> = channels_with_tallies(leads)
        .map(|(channel, tally)| {
            let monthly_spend = economics.profile(channel).monthly_spend;
            MarketingRoiRow {
                channel,
                monthly_spend,
                spend: monthly_spend,
                revenue: tally.revenue,
                roi: return_on_spend(tally.revenue, monthly_spend).round() as i64,
                cost_per_high_quality_lead: round_amount(tally.cost_per_high_quality_lead()),
                conversion_rate: round_to(tally.conversion_rate(), 1),
                lead_volume: tally.volume,
                high_quality_leads: tally.tiers.high,
                converted_leads: tally.converted,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.roi.cmp(&a.roi));
    rows
}

pub fn cost_per_lead_by_channel(leads: &[Lead]) -> Vec<CostPerLeadRow> {
    channels_with_tallies(leads)
        .map(|(channel, tally)| CostPerLeadRow {
            channel,
            cost_per_lead_all: round_amount(ratio(tally.total_cost as f64, tally.volume as f64)),
            cost_per_lead_hq: round_amount(tally.cost_per_high_quality_lead()),
            efficiency: percentage_label(tally.tiers.high, tally.volume),
        })
        .collect()
}

pub fn spend_vs_return(leads: &[Lead], economics: &ChannelEconomics) -> Vec<SpendReturnRow> {
    channels_with_tallies(leads)
        .map(|(channel, tally)| {
            let spend = economics.profile(channel).monthly_spend;
            SpendReturnRow {
                channel,
                spend,
                returned: tally.revenue,
                high_quality_leads: tally.tiers.high,
                profitability: tally.revenue as i64 - spend as i64,
            }
        })
        .collect()
}

/// Bubble-chart placement per channel. Channels without leads have no
/// position on the chart and are left out.
pub fn campaign_quadrant(leads: &[Lead], thresholds: &QuadrantThresholds) -> Vec<QuadrantPoint> {
    channels_with_tallies(leads)
        .filter(|(_, tally)| tally.volume > 0)
        .map(|(channel, tally)| {
            let x = round_amount(tally.cost_per_high_quality_lead());
            let y = round_to(tally.conversion_rate(), 1);
            QuadrantPoint {
                channel,
                x,
                y,
                size: tally.volume,
                value: tally.volume,
                quadrant: thresholds.classify(x as f64, y),
            }
        })
        .collect()
}

/// CAC / LTV economics per channel, best LTV:CAC first.
pub fn acquisition_economics(
    leads: &[Lead],
    economics: &ChannelEconomics,
) -> Vec<AcquisitionEconomicsRow> {
    let mut rows: Vec<AcquisitionEconomicsRow> = channels_with_tallies(leads)
        .map(|(channel, tally)| {
            let spend = economics.profile(channel).monthly_spend;
            let cac = ratio(spend as f64, tally.converted as f64);
            let ltv = ratio(tally.revenue as f64, tally.converted as f64);
            AcquisitionEconomicsRow {
                channel,
                spend,
                customers: tally.converted,
                revenue: tally.revenue,
                cac: round_amount(cac),
                ltv: round_amount(ltv),
                ltv_cac: round_to(ratio(ltv, cac), 1),
                roas: round_to(ratio(tally.revenue as f64, spend as f64), 2),
                payback_months: round_to(ratio(cac, ltv / 12.0), 1),
            }
        })
        .collect();

    rows.sort_by(|a, b| descending(a.ltv_cac, b.ltv_cac));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{converted, lead};
    use crate::economics::ChannelProfile;

    fn economics_with_spend(spend: u64) -> ChannelEconomics {
        ChannelEconomics::from_profiles(LeadSource::ordered().into_iter().map(|channel| {
            ChannelProfile {
                channel,
                high_quality_rate: 0.5,
                cost_per_lead: 50,
                monthly_spend: spend,
            }
        }))
        .expect("complete table")
    }

    #[test]
    fn source_vs_quality_lists_every_channel() {
        let leads = vec![lead(LeadSource::Referrals, 90), lead(LeadSource::Referrals, 30)];

        let rows = source_vs_quality(&leads);

        assert_eq!(rows.len(), LeadSource::COUNT);
        let referrals = &rows[LeadSource::Referrals.index()];
        assert_eq!(referrals.counts.high, 1);
        assert_eq!(referrals.counts.low, 1);
        assert_eq!(referrals.total, 2);
        let email = &rows[LeadSource::Email.index()];
        assert_eq!(email.counts, TierCounts::default());
    }

    #[test]
    fn roi_is_signed_against_monthly_spend() {
        let economics = economics_with_spend(1000);
        let leads = vec![
            converted(lead(LeadSource::GoogleAds, 80), 1500),
            converted(lead(LeadSource::LinkedIn, 80), 1000),
            converted(lead(LeadSource::Seo, 80), 400),
        ];

        let rows = marketing_roi_by_channel(&leads, &economics);
        let roi_of = |channel: LeadSource| {
            rows.iter()
                .find(|row| row.channel == channel)
                .map(|row| row.roi)
                .expect("row present")
        };

        assert_eq!(roi_of(LeadSource::GoogleAds), 50);
        assert_eq!(roi_of(LeadSource::LinkedIn), 0);
        assert_eq!(roi_of(LeadSource::Seo), -60);
        assert_eq!(rows[0].channel, LeadSource::GoogleAds);
        assert!(rows.windows(2).all(|pair| pair[0].roi >= pair[1].roi));
    }

    #[test]
    fn channel_without_high_quality_leads_costs_zero() {
        let leads = vec![lead(LeadSource::SocialMedia, 20), lead(LeadSource::SocialMedia, 45)];

        let metrics = channel_metrics(&leads, &ChannelEconomics::standard());
        let social = metrics
            .iter()
            .find(|row| row.channel == LeadSource::SocialMedia)
            .expect("social row");
        assert_eq!(social.cost_per_high_quality_lead, 0.0);
        assert!(social.roi.is_finite());

        let costs = cost_per_lead_by_channel(&leads);
        let social = &costs[LeadSource::SocialMedia.index()];
        assert_eq!(social.cost_per_lead_hq, 0);
        assert_eq!(social.cost_per_lead_all, 50);
        assert_eq!(social.efficiency, "0");
    }

    #[test]
    fn spend_vs_return_reports_profitability() {
        let leads = vec![converted(lead(LeadSource::Email, 75), 2500)];

        let rows = spend_vs_return(&leads, &ChannelEconomics::standard());
        let email = &rows[LeadSource::Email.index()];

        assert_eq!(email.spend, 2000);
        assert_eq!(email.returned, 2500);
        assert_eq!(email.profitability, 500);
        assert_eq!(rows[LeadSource::Seo.index()].profitability, -8000);
    }

    #[test]
    fn quadrant_classification_uses_thresholds() {
        let thresholds = QuadrantThresholds::default();
        assert_eq!(thresholds.classify(80.0, 12.0), CampaignQuadrant::Winners);
        assert_eq!(thresholds.classify(150.0, 12.0), CampaignQuadrant::Watch);
        assert_eq!(thresholds.classify(80.0, 3.0), CampaignQuadrant::Nurture);
        assert_eq!(thresholds.classify(150.0, 3.0), CampaignQuadrant::Losers);
        assert_eq!(thresholds.classify(100.0, 8.0), CampaignQuadrant::Winners);
    }

    #[test]
    fn quadrant_skips_empty_channels() {
        let leads = vec![
            converted(lead(LeadSource::Referrals, 90), 1000),
            lead(LeadSource::Referrals, 80),
        ];

        let points = campaign_quadrant(&leads, &QuadrantThresholds::default());

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.channel, LeadSource::Referrals);
        assert_eq!(point.x, 50);
        assert_eq!(point.y, 50.0);
        assert_eq!(point.size, 2);
        assert_eq!(point.quadrant, CampaignQuadrant::Winners);
    }

    #[test]
    fn acquisition_economics_guards_channels_without_customers() {
        let economics = economics_with_spend(1200);
        let leads = vec![
            converted(lead(LeadSource::Referrals, 90), 12_000),
            converted(lead(LeadSource::Referrals, 85), 6_000),
        ];

        let rows = acquisition_economics(&leads, &economics);

        let referrals = &rows[0];
        assert_eq!(referrals.channel, LeadSource::Referrals);
        assert_eq!(referrals.customers, 2);
        assert_eq!(referrals.cac, 600);
        assert_eq!(referrals.ltv, 9_000);
        assert_eq!(referrals.ltv_cac, 15.0);
        assert_eq!(referrals.roas, 15.0);
        assert_eq!(referrals.payback_months, 0.8);

        let idle = rows
            .iter()
            .find(|row| row.channel == LeadSource::Email)
            .expect("email row");
        assert_eq!(idle.cac, 0);
        assert_eq!(idle.ltv_cac, 0.0);
        assert_eq!(idle.payback_months, 0.0);
    }
}
