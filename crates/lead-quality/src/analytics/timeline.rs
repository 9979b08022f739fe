//! Time-bucketed reducers: weekday/hour heatmap, weekly tier trend and the
//! calendar-month marketing trend.

use super::channels::return_on_spend;
use super::helpers::{percentage, ratio};
use super::views::{HeatmapCell, MonthlyTrendRow, TierCounts, TrendWeek};
use crate::catalog::Lead;
use crate::economics::ChannelEconomics;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::BTreeMap;

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const TREND_WEEKS: i64 = 12;
pub const TREND_MONTHS: usize = 12;

const HOURS: usize = 24;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Score shown for a heatmap cell nobody occupies. Weekdays, business hours
/// (9-17) and the early afternoon (13-15) are boosted.
pub const fn baseline_score(day: usize, hour: usize) -> u8 {
    let mut score = 40;
    if day < 5 {
        score += 15;
    }
    if hour >= 9 && hour <= 17 {
        score += 20;
    }
    if hour >= 13 && hour <= 15 {
        score += 10;
    }
    score
}

/// Mean score per (weekday, hour) in UTC, Monday first. Cells are emitted
/// day-major, 168 in total.
pub fn quality_heatmap(leads: &[Lead]) -> Vec<HeatmapCell> {
    let mut sums = [[(0u64, 0usize); HOURS]; 7];
    for lead in leads {
        let day = lead.date_created.weekday().num_days_from_monday() as usize;
        let hour = lead.date_created.hour() as usize;
        let cell = &mut sums[day][hour];
        cell.0 += u64::from(lead.quality_score);
        cell.1 += 1;
    }

    let mut cells = Vec::with_capacity(WEEKDAYS.len() * HOURS);
    for (day, label) in WEEKDAYS.into_iter().enumerate() {
        for hour in 0..HOURS {
            let (sum, sample_size) = sums[day][hour];
            let score = if sample_size == 0 {
                baseline_score(day, hour)
            } else {
                ratio(sum as f64, sample_size as f64).round() as u8
            };
            cells.push(HeatmapCell {
                day: label,
                hour: format!("{hour}:00"),
                score,
                sample_size,
            });
        }
    }
    cells
}

/// Whole weeks between `created` and `as_of`; negative for future leads.
pub fn weeks_ago(created: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    let elapsed = (as_of - created).num_milliseconds();
    elapsed.div_euclid(MILLIS_PER_DAY).div_euclid(7)
}

/// Tier counts for the trailing twelve weeks, oldest first (`Week 1`) up to
/// the week containing `as_of` (`Week 12`).
pub fn quality_trend_line(leads: &[Lead], as_of: DateTime<Utc>) -> Vec<TrendWeek> {
    let mut weeks = [TierCounts::default(); TREND_WEEKS as usize];
    for lead in leads {
        let ago = weeks_ago(lead.date_created, as_of);
        if (0..TREND_WEEKS).contains(&ago) {
            weeks[(TREND_WEEKS - 1 - ago) as usize].record(lead.quality_tier);
        }
    }

    weeks
        .into_iter()
        .enumerate()
        .map(|(index, counts)| TrendWeek {
            week: format!("Week {}", index + 1),
            counts,
        })
        .collect()
}

#[derive(Debug, Default)]
struct MonthBucket {
    leads: usize,
    high_quality: usize,
    converted: usize,
    revenue: u64,
}

/// Calendar-month trend over the last twelve months that have leads.
/// Spend per month is the combined monthly spend of every channel; it is a
/// fixed budget, not prorated from the number of leads created that month.
pub fn monthly_trend(leads: &[Lead], economics: &ChannelEconomics) -> Vec<MonthlyTrendRow> {
    let mut months: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();
    for lead in leads {
        let key = (lead.date_created.year(), lead.date_created.month());
        let bucket = months.entry(key).or_default();
        bucket.leads += 1;
        if lead.is_high_quality() {
            bucket.high_quality += 1;
        }
        if lead.converted {
            bucket.converted += 1;
            bucket.revenue += lead.revenue_potential;
        }
    }

    let spend = economics.total_monthly_spend();
    let skip = months.len().saturating_sub(TREND_MONTHS);

    months
        .into_iter()
        .skip(skip)
        .map(|((year, month), bucket)| MonthlyTrendRow {
            month: format!("{year:04}-{month:02}"),
            spend,
            leads: bucket.leads,
            high_quality_leads: bucket.high_quality,
            revenue: bucket.revenue,
            conversion_rate: percentage(bucket.converted, bucket.leads).round() as i64,
            roi: return_on_spend(bucket.revenue, spend).round() as i64,
        })
        .collect()
}
