use crate::catalog::Lead;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a generated (or imported) lead population.
///
/// `generated_at` is the reference "now" for every time-relative reducer, so
/// aggregating the same snapshot twice yields identical views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPopulation {
    generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    leads: Vec<Lead>,
}

impl LeadPopulation {
    pub fn new(generated_at: DateTime<Utc>, seed: Option<u64>, leads: Vec<Lead>) -> Self {
        Self {
            generated_at,
            seed,
            leads,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// New snapshot restricted to leads created within `[start, end]`.
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let leads = self
            .leads
            .iter()
            .filter(|lead| lead.date_created >= start && lead.date_created <= end)
            .cloned()
            .collect();

        Self {
            generated_at: self.generated_at,
            seed: self.seed,
            leads,
        }
    }

    pub fn into_leads(self) -> Vec<Lead> {
        self.leads
    }
}

impl AsRef<[Lead]> for LeadPopulation {
    fn as_ref(&self) -> &[Lead] {
        &self.leads
    }
}
