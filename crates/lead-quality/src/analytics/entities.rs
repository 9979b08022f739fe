//! Per-entity tables: industries derived from the population, partners and
//! pipeline customers from static books rescaled for display.

use super::filter::{DisplayOptions, DisplayScale, FilterError};
use super::helpers::{percentage, ratio, round_amount, round_to};
use super::views::{IndustryPerformanceRow, PartnerScorecard, PipelineCustomer, SalesPipeline};
use crate::catalog::{Industry, Lead};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default)]
struct IndustryTally {
    volume: usize,
    high_quality: usize,
    converted: usize,
    revenue: u64,
    potential: u64,
}

/// Volume, quality and revenue per industry, highest revenue first.
pub fn industry_performance(leads: &[Lead]) -> Vec<IndustryPerformanceRow> {
    let mut tallies = [IndustryTally::default(); Industry::COUNT];
    for lead in leads {
        let tally = &mut tallies[lead.industry.index()];
        tally.volume += 1;
        tally.potential += lead.revenue_potential;
        if lead.is_high_quality() {
            tally.high_quality += 1;
        }
        if lead.converted {
            tally.converted += 1;
            tally.revenue += lead.revenue_potential;
        }
    }

    let mut rows: Vec<IndustryPerformanceRow> = Industry::ordered()
        .into_iter()
        .zip(tallies)
        .map(|(industry, tally)| IndustryPerformanceRow {
            industry,
            volume: tally.volume,
            high_quality_percentage: round_to(percentage(tally.high_quality, tally.volume), 1),
            conversion_rate: round_to(percentage(tally.converted, tally.volume), 1),
            revenue: tally.revenue,
            avg_revenue_potential: round_amount(ratio(tally.potential as f64, tally.volume as f64)),
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

macro_rules! period_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($label:literal, $multiplier:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const fn ordered() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub const fn multiplier(self) -> f64 {
                match self {
                    $(Self::$variant => $multiplier),+
                }
            }

            pub fn scale(self) -> DisplayScale {
                DisplayScale::new(self.multiplier()).unwrap_or_default()
            }
        }

        impl FromStr for $name {
            type Err = FilterError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ordered()
                    .iter()
                    .copied()
                    .find(|period| period.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| FilterError::UnknownPeriod(raw.to_string()))
            }
        }
    };
}

period_enum! {
    /// Reporting periods of the partner scorecards, relative to a 90-day base.
    PartnerPeriod {
        Last90Days => ("last-90-days", 1.0),
        YearToDate => ("year-to-date", 2.5),
        Last12Months => ("last-12-months", 3.2),
    }
}

period_enum! {
    /// Reporting periods of the sales pipeline, relative to a 30-day base.
    PipelinePeriod {
        Last7Days => ("last-7", 0.12),
        Last30Days => ("last-30", 1.0),
        Last90Days => ("last-90", 3.2),
        YearToDate => ("year-to-date", 8.5),
        AllTime => ("all-time", 12.0),
    }
}

/// Base-period figures for one partner.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRecord {
    pub name: &'static str,
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
    pub new_clients: u64,
    pub new_matters: u64,
    pub win_rate: u8,
    pub bd_pipeline_value: u64,
    pub trend_revenue: [u64; 12],
    pub trend_profit: [u64; 12],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartnerDirectory {
    partners: Vec<PartnerRecord>,
}

impl PartnerDirectory {
    pub fn new(partners: Vec<PartnerRecord>) -> Self {
        Self { partners }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            PartnerRecord {
                name: "Alex Carter",
                partner_revenue: 1_240_000,
                new_client_revenue: 320_000,
                matter_profit: 420_000,
                matter_margin: 36,
                realisation: 92,
                collection: 97,
                leverage: 3.4,
                utilisation: 81,
                retention: 94,
                net_growth: 11,
                concentration_top3: 48,
                new_clients: 7,
                new_matters: 18,
                win_rate: 46,
                bd_pipeline_value: 930_000,
                trend_revenue: [95, 102, 108, 115, 118, 125, 130, 135, 140, 145, 150, 155],
                trend_profit: [32, 36, 38, 42, 44, 48, 51, 54, 58, 61, 65, 68],
            },
            PartnerRecord {
                name: "Morgan Lee",
                partner_revenue: 980_000,
                new_client_revenue: 240_000,
                matter_profit: 310_000,
                matter_margin: 32,
                realisation: 88,
                collection: 95,
                leverage: 3.1,
                utilisation: 78,
                retention: 91,
                net_growth: 8,
                concentration_top3: 52,
                new_clients: 5,
                new_matters: 14,
                win_rate: 42,
                bd_pipeline_value: 680_000,
                trend_revenue: [80, 85, 88, 92, 95, 98, 101, 104, 106, 109, 112, 115],
                trend_profit: [24, 27, 28, 30, 31, 32, 33, 35, 36, 38, 39, 41],
            },
            PartnerRecord {
                name: "Jordan Patel",
                partner_revenue: 1_520_000,
                new_client_revenue: 380_000,
                matter_profit: 510_000,
                matter_margin: 38,
                realisation: 95,
                collection: 98,
                leverage: 3.7,
                utilisation: 84,
                retention: 96,
                net_growth: 14,
                concentration_top3: 44,
                new_clients: 9,
                new_matters: 22,
                win_rate: 51,
                bd_pipeline_value: 1_150_000,
                trend_revenue: [110, 118, 125, 132, 140, 148, 155, 162, 170, 177, 185, 192],
                trend_profit: [40, 44, 47, 50, 53, 57, 60, 63, 67, 70, 74, 77],
            },
            PartnerRecord {
                name: "Taylor Chen",
                partner_revenue: 1_100_000,
                new_client_revenue: 290_000,
                matter_profit: 380_000,
                matter_margin: 34,
                realisation: 90,
                collection: 96,
                leverage: 3.3,
                utilisation: 80,
                retention: 92,
                net_growth: 10,
                concentration_top3: 50,
                new_clients: 6,
                new_matters: 16,
                win_rate: 44,
                bd_pipeline_value: 820_000,
                trend_revenue: [90, 97, 103, 110, 116, 123, 129, 136, 142, 149, 155, 162],
                trend_profit: [28, 32, 34, 37, 39, 42, 44, 47, 50, 53, 55, 58],
            },
        ])
    }

    pub fn partners(&self) -> &[PartnerRecord] {
        &self.partners
    }
}

impl Default for PartnerDirectory {
    fn default() -> Self {
        Self::standard()
    }
}

/// Partner scorecards rescaled for display, highest revenue first. Rates
/// and percentages are never scaled.
pub fn partner_scorecards(
    directory: &PartnerDirectory,
    display: &DisplayOptions,
) -> Vec<PartnerScorecard> {
    let mut adjuster = display.adjuster();
    let mut cards: Vec<PartnerScorecard> = directory
        .partners()
        .iter()
        .map(|partner| {
            let partner_revenue = adjuster.amount(partner.partner_revenue);
            let new_client_revenue = adjuster.amount(partner.new_client_revenue);
            let matter_profit = adjuster.amount(partner.matter_profit);
            let new_clients = display.scale.scale_count(partner.new_clients);
            let bd_pipeline_value = adjuster.amount(partner.bd_pipeline_value);
            PartnerScorecard {
                partner: partner.name,
                partner_revenue,
                new_client_revenue,
                matter_profit,
                matter_margin: partner.matter_margin,
                realisation: partner.realisation,
                collection: partner.collection,
                leverage: partner.leverage,
                utilisation: partner.utilisation,
                retention: partner.retention,
                net_growth: partner.net_growth,
                concentration_top3: partner.concentration_top3,
                win_rate: partner.win_rate,
                new_clients,
                new_matters: display.scale.scale_count(partner.new_matters),
                bd_pipeline_value,
                profit_margin: round_to(percentage_of(matter_profit, partner_revenue), 1),
                revenue_per_new_client: round_amount(ratio(
                    new_client_revenue as f64,
                    new_clients as f64,
                )),
                pipeline_coverage: round_to(
                    ratio(bd_pipeline_value as f64, new_client_revenue as f64),
                    2,
                ),
                trend_revenue: partner
                    .trend_revenue
                    .iter()
                    .map(|&value| display.scale.scale_amount(value))
                    .collect(),
                trend_profit: partner
                    .trend_profit
                    .iter()
                    .map(|&value| display.scale.scale_amount(value))
                    .collect(),
            }
        })
        .collect();

    cards.sort_by(|a, b| b.partner_revenue.cmp(&a.partner_revenue));
    cards
}

fn percentage_of(part: u64, whole: u64) -> f64 {
    ratio(part as f64, whole as f64) * 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub name: &'static str,
    pub revenue: u64,
}

/// Base-period pipeline book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerBook {
    customers: Vec<CustomerRecord>,
    products_sold: u64,
}

impl CustomerBook {
    pub fn new(customers: Vec<CustomerRecord>, products_sold: u64) -> Self {
        Self {
            customers,
            products_sold,
        }
    }

    pub fn standard() -> Self {
        let customer = |name, revenue| CustomerRecord { name, revenue };
        Self::new(
            vec![
                customer("Visionary Enterprises", 21_000),
                customer("Swift Enterprises", 19_047),
                customer("United Solutions", 18_121),
                customer("Titan Enterprises", 17_743),
                customer("Fusion Systems", 16_751),
                customer("Alpha Corporation", 12_440),
            ],
            122,
        )
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn products_sold(&self) -> u64 {
        self.products_sold
    }
}

impl Default for CustomerBook {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pipeline revenue per customer rescaled for display, largest first.
///
/// The customer count is scaled with the period like every other volume, so
/// the average is taken over that scaled count.
pub fn sales_pipeline(book: &CustomerBook, display: &DisplayOptions) -> SalesPipeline {
    let mut adjuster = display.adjuster();
    let mut scaled: Vec<(&'static str, u64)> = book
        .customers()
        .iter()
        .map(|customer| (customer.name, adjuster.amount(customer.revenue)))
        .collect();
    scaled.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });

    let total_revenue: u64 = scaled.iter().map(|(_, revenue)| revenue).sum();
    let customer_count = display.scale.scale_count(book.customers().len() as u64);
    let customers = scaled
        .into_iter()
        .map(|(name, revenue)| PipelineCustomer {
            name,
            revenue,
            revenue_share: round_to(percentage_of(revenue, total_revenue), 1),
        })
        .collect();

    SalesPipeline {
        customers,
        total_revenue,
        customer_count: customer_count as usize,
        products_sold: display.scale.scale_count(book.products_sold()),
        average_revenue_per_customer: round_amount(ratio(
            total_revenue as f64,
            customer_count as f64,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::filter::DisplayJitter;
    use crate::analytics::testing::{converted, lead};
    use crate::catalog::LeadSource;

    #[test]
    fn industry_rows_cover_every_industry_sorted_by_revenue() {
        let mut litigation = converted(lead(LeadSource::Seo, 80), 200_000);
        litigation.industry = Industry::Litigation;
        let mut family = converted(lead(LeadSource::Seo, 50), 50_000);
        family.industry = Industry::FamilyLaw;
        let mut open_family = lead(LeadSource::Seo, 30);
        open_family.industry = Industry::FamilyLaw;
        open_family.revenue_potential = 150_000;

        let rows = industry_performance(&[litigation, family, open_family]);

        assert_eq!(rows.len(), Industry::COUNT);
        assert_eq!(rows[0].industry, Industry::Litigation);
        assert_eq!(rows[0].high_quality_percentage, 100.0);
        assert_eq!(rows[1].industry, Industry::FamilyLaw);
        assert_eq!(rows[1].conversion_rate, 50.0);
        assert_eq!(rows[1].avg_revenue_potential, 100_000);
        let idle = rows
            .iter()
            .find(|row| row.industry == Industry::RealEstate)
            .expect("real estate row");
        assert_eq!(idle.volume, 0);
        assert_eq!(idle.avg_revenue_potential, 0);
    }

    #[test]
    fn periods_expose_their_multipliers() {
        assert_eq!(PartnerPeriod::YearToDate.multiplier(), 2.5);
        assert_eq!("last-7".parse::<PipelinePeriod>(), Ok(PipelinePeriod::Last7Days));
        assert!("forever".parse::<PipelinePeriod>().is_err());
        assert_eq!(PipelinePeriod::ordered().len(), 5);
    }

    #[test]
    fn base_period_scorecards_match_the_directory() {
        let cards = partner_scorecards(&PartnerDirectory::standard(), &DisplayOptions::default());

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].partner, "Jordan Patel");
        assert_eq!(cards[3].partner, "Morgan Lee");
        let alex = cards
            .iter()
            .find(|card| card.partner == "Alex Carter")
            .expect("alex present");
        assert_eq!(alex.partner_revenue, 1_240_000);
        assert_eq!(alex.profit_margin, 33.9);
        assert_eq!(alex.revenue_per_new_client, 45_714);
        assert_eq!(alex.trend_revenue.len(), 12);
    }

    #[test]
    fn scaling_leaves_rates_untouched() {
        let display = DisplayOptions::scaled(PartnerPeriod::YearToDate.scale());
        let cards = partner_scorecards(&PartnerDirectory::standard(), &display);
        let alex = cards
            .iter()
            .find(|card| card.partner == "Alex Carter")
            .expect("alex present");

        assert_eq!(alex.partner_revenue, 3_100_000);
        assert_eq!(alex.new_clients, 18);
        assert_eq!(alex.win_rate, 46);
        assert_eq!(alex.realisation, 92);
        assert_eq!(alex.trend_revenue[0], 238);
    }

    #[test]
    fn pipeline_totals_and_shares() {
        let pipeline = sales_pipeline(&CustomerBook::standard(), &DisplayOptions::default());

        assert_eq!(pipeline.total_revenue, 105_102);
        assert_eq!(pipeline.customer_count, 6);
        assert_eq!(pipeline.products_sold, 122);
        assert_eq!(pipeline.average_revenue_per_customer, 17_517);
        assert_eq!(pipeline.customers[0].name, "Visionary Enterprises");
        assert_eq!(pipeline.customers[0].revenue_share, 20.0);
    }

    #[test]
    fn pipeline_scales_with_period() {
        let display = DisplayOptions::scaled(PipelinePeriod::AllTime.scale());
        let pipeline = sales_pipeline(&CustomerBook::standard(), &display);

        assert_eq!(pipeline.customers[0].revenue, 252_000);
        assert_eq!(pipeline.customer_count, 72);
        assert_eq!(pipeline.products_sold, 1_464);
    }

    #[test]
    fn jittered_tables_are_stable_per_seed() {
        let display = DisplayOptions {
            scale: DisplayScale::IDENTITY,
            jitter: Some(DisplayJitter::new(9, 0.05).expect("valid spread")),
        };

        let first = sales_pipeline(&CustomerBook::standard(), &display);
        let second = sales_pipeline(&CustomerBook::standard(), &display);

        assert_eq!(first, second);
        assert_ne!(first.total_revenue, 105_102);
    }

    #[test]
    fn empty_book_does_not_divide_by_zero() {
        let pipeline = sales_pipeline(&CustomerBook::new(Vec::new(), 0), &DisplayOptions::default());
        assert_eq!(pipeline.total_revenue, 0);
        assert_eq!(pipeline.average_revenue_per_customer, 0);
        assert!(pipeline.customers.is_empty());
    }
}
