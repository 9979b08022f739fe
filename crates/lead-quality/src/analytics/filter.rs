//! Explicit filter and display settings passed into the aggregation layer.
//!
//! Filtering narrows the population before any reducer runs. Display scaling
//! only rescales numbers that have already been computed and never touches the
//! population itself.

use crate::generator::LeadPopulation;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown time period '{0}'")]
    UnknownPeriod(String),
    #[error("'{0}' is not a calendar month in YYYY-MM form")]
    InvalidMonth(String),
    #[error("display multiplier {0} must be a finite, non-negative number")]
    InvalidMultiplier(f64),
    #[error("display jitter spread {0} must lie within [0, 1)")]
    InvalidSpread(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "last-3-months")]
    Last3Months,
    #[serde(rename = "last-6-months")]
    Last6Months,
    #[default]
    #[serde(rename = "last-12-months")]
    Last12Months,
    #[serde(rename = "month-by-month")]
    MonthByMonth,
}

impl TimePeriod {
    /// Trailing window used when month-by-month has no month selected.
    pub const MONTH_FALLBACK_DAYS: i64 = 30;

    pub const fn ordered() -> [Self; 4] {
        [
            Self::Last3Months,
            Self::Last6Months,
            Self::Last12Months,
            Self::MonthByMonth,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Last3Months => "last-3-months",
            Self::Last6Months => "last-6-months",
            Self::Last12Months => "last-12-months",
            Self::MonthByMonth => "month-by-month",
        }
    }

    pub const fn lookback_days(self) -> i64 {
        match self {
            Self::Last3Months => 90,
            Self::Last6Months => 180,
            Self::Last12Months => 365,
            Self::MonthByMonth => Self::MONTH_FALLBACK_DAYS,
        }
    }
}

impl FromStr for TimePeriod {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|period| period.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FilterError::UnknownPeriod(raw.to_string()))
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, FilterError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| FilterError::InvalidMonth(format!("{year}-{month:02}")))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Inclusive UTC bounds: midnight on the first through the last
    /// millisecond of the final day.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.first_day()?;
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0)?);
        let end = Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?) - Duration::milliseconds(1);
        Some((start, end))
    }
}

impl FromStr for YearMonth {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || FilterError::InvalidMonth(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Which slice of the population the views are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(default)]
    pub period: TimePeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_month: Option<YearMonth>,
}

impl FilterConfig {
    pub fn new(period: TimePeriod, selected_month: Option<YearMonth>) -> Self {
        Self {
            period,
            selected_month,
        }
    }

    /// Inclusive creation-time window relative to `now`. A selected month is
    /// only honoured by [`TimePeriod::MonthByMonth`].
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let trailing = (now - Duration::days(self.period.lookback_days()), now);
        match (self.period, self.selected_month) {
            (TimePeriod::MonthByMonth, Some(month)) => month.bounds().unwrap_or(trailing),
            _ => trailing,
        }
    }

    /// Leads created within [`FilterConfig::window`], using the snapshot's
    /// generation time as "now".
    pub fn apply(&self, population: &LeadPopulation) -> LeadPopulation {
        let (start, end) = self.window(population.generated_at());
        population.within(start, end)
    }
}

/// Post-processing multiplier for already-computed amounts and counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DisplayScale(f64);

impl DisplayScale {
    pub const IDENTITY: Self = Self(1.0);

    pub fn new(multiplier: f64) -> Result<Self, FilterError> {
        if multiplier.is_finite() && multiplier >= 0.0 {
            Ok(Self(multiplier))
        } else {
            Err(FilterError::InvalidMultiplier(multiplier))
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.0
    }

    pub fn scale_amount(&self, value: u64) -> u64 {
        (value as f64 * self.0).round() as u64
    }

    pub fn scale_count(&self, value: u64) -> u64 {
        self.scale_amount(value)
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<f64> for DisplayScale {
    type Error = FilterError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayScale> for f64 {
    fn from(value: DisplayScale) -> Self {
        value.0
    }
}

/// Cosmetic noise for display tables: each value is nudged by a factor drawn
/// from `[1 - spread, 1 + spread]`. The same seed always yields the same
/// nudges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawJitter")]
pub struct DisplayJitter {
    seed: u64,
    spread: f64,
}

impl DisplayJitter {
    pub fn new(seed: u64, spread: f64) -> Result<Self, FilterError> {
        if (0.0..1.0).contains(&spread) {
            Ok(Self { seed, spread })
        } else {
            Err(FilterError::InvalidSpread(spread))
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }
}

#[derive(Deserialize)]
struct RawJitter {
    seed: u64,
    spread: f64,
}

impl TryFrom<RawJitter> for DisplayJitter {
    type Error = FilterError;

    fn try_from(raw: RawJitter) -> Result<Self, Self::Error> {
        Self::new(raw.seed, raw.spread)
    }
}

/// Scale plus optional jitter applied to static display tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default)]
    pub scale: DisplayScale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<DisplayJitter>,
}

impl DisplayOptions {
    pub fn scaled(scale: DisplayScale) -> Self {
        Self {
            scale,
            jitter: None,
        }
    }

    pub fn adjuster(&self) -> DisplayAdjuster {
        DisplayAdjuster {
            scale: self.scale,
            jitter: self
                .jitter
                .map(|jitter| (StdRng::seed_from_u64(jitter.seed), jitter.spread)),
        }
    }
}

/// Stateful applicator created per table so jitter draws stay in a fixed order.
#[derive(Debug)]
pub struct DisplayAdjuster {
    scale: DisplayScale,
    jitter: Option<(StdRng, f64)>,
}

impl DisplayAdjuster {
    pub fn multiplier(&self) -> f64 {
        self.scale.multiplier()
    }

    pub fn amount(&mut self, value: u64) -> u64 {
        let factor = match &mut self.jitter {
            Some((rng, spread)) if *spread > 0.0 => 1.0 + rng.gen_range(-*spread..=*spread),
            _ => 1.0,
        };
        (value as f64 * self.scale.multiplier() * factor).round() as u64
    }
}
