//! CSV persistence for lead population snapshots.
//!
//! A snapshot is one row per lead with category labels and RFC 3339
//! timestamps. Importing re-validates every label and the score/tier pairing.

use super::population::LeadPopulation;
use crate::catalog::{
    CatalogError, CommunicationPreference, Industry, Lead, LeadId, LeadSource, LeadStage,
    QualityTier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access lead snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lead snapshot CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Catalog {
        row: usize,
        #[source]
        source: CatalogError,
    },
    #[error("row {row}: '{value}' is not an RFC 3339 timestamp")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: quality score {score} exceeds 100")]
    ScoreOutOfRange { row: usize, score: u8 },
    #[error("row {row}: tier {tier} is inconsistent with quality score {score}")]
    InconsistentTier {
        row: usize,
        score: u8,
        tier: QualityTier,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRow {
    id: String,
    source: String,
    date_created: String,
    firm_size: u32,
    industry: String,
    revenue_potential: u64,
    quality_score: u8,
    quality_tier: String,
    engagement_score: u8,
    stage: String,
    days_in_funnel: u16,
    converted: bool,
    cost_per_lead: u32,
    communication_preference: String,
}

impl SnapshotRow {
    fn from_lead(lead: &Lead) -> Self {
        Self {
            id: lead.id.0.clone(),
            source: lead.source.label().to_string(),
            date_created: lead.date_created.to_rfc3339(),
            firm_size: lead.firm_size,
            industry: lead.industry.label().to_string(),
            revenue_potential: lead.revenue_potential,
            quality_score: lead.quality_score,
            quality_tier: lead.quality_tier.label().to_string(),
            engagement_score: lead.engagement_score,
            stage: lead.stage.label().to_string(),
            days_in_funnel: lead.days_in_funnel,
            converted: lead.converted,
            cost_per_lead: lead.cost_per_lead,
            communication_preference: lead.communication_preference.label().to_string(),
        }
    }

    fn into_lead(self, row: usize) -> Result<Lead, SnapshotError> {
        let catalog = |source: CatalogError| SnapshotError::Catalog { row, source };

        let source: LeadSource = self.source.parse().map_err(catalog)?;
        let industry: Industry = self.industry.parse().map_err(catalog)?;
        let quality_tier: QualityTier = self.quality_tier.parse().map_err(catalog)?;
        let stage: LeadStage = self.stage.parse().map_err(catalog)?;
        let communication_preference: CommunicationPreference =
            self.communication_preference.parse().map_err(catalog)?;

        let date_created = DateTime::parse_from_rfc3339(self.date_created.trim())
            .map(|value| value.with_timezone(&Utc))
            .map_err(|_| SnapshotError::Timestamp {
                row,
                value: self.date_created.clone(),
            })?;

        if self.quality_score > 100 {
            return Err(SnapshotError::ScoreOutOfRange {
                row,
                score: self.quality_score,
            });
        }
        if QualityTier::from_score(self.quality_score) != quality_tier {
            return Err(SnapshotError::InconsistentTier {
                row,
                score: self.quality_score,
                tier: quality_tier,
            });
        }

        Ok(Lead {
            id: LeadId(self.id),
            source,
            date_created,
            firm_size: self.firm_size,
            industry,
            revenue_potential: self.revenue_potential,
            quality_score: self.quality_score,
            quality_tier,
            engagement_score: self.engagement_score,
            stage,
            days_in_funnel: self.days_in_funnel,
            converted: self.converted,
            cost_per_lead: self.cost_per_lead,
            communication_preference,
        })
    }
}

pub fn export_csv<W: Write>(population: &LeadPopulation, writer: W) -> Result<(), SnapshotError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for lead in population.leads() {
        csv_writer.serialize(SnapshotRow::from_lead(lead))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a snapshot. When `as_of` is absent the latest creation timestamp is
/// used as the snapshot's reference time (or the current time for an empty file).
pub fn import_csv<R: Read>(
    reader: R,
    as_of: Option<DateTime<Utc>>,
) -> Result<LeadPopulation, SnapshotError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut leads = Vec::new();

    for (index, record) in csv_reader.deserialize::<SnapshotRow>().enumerate() {
        let row = record?;
        leads.push(row.into_lead(index + 1)?);
    }

    let generated_at = as_of
        .or_else(|| leads.iter().map(|lead| lead.date_created).max())
        .unwrap_or_else(Utc::now);

    Ok(LeadPopulation::new(generated_at, None, leads))
}

pub fn export_to_path<P: AsRef<Path>>(
    population: &LeadPopulation,
    path: P,
) -> Result<(), SnapshotError> {
    let file = std::fs::File::create(path)?;
    export_csv(population, file)
}

pub fn import_from_path<P: AsRef<Path>>(
    path: P,
    as_of: Option<DateTime<Utc>>,
) -> Result<LeadPopulation, SnapshotError> {
    let file = std::fs::File::open(path)?;
    import_csv(file, as_of)
}
