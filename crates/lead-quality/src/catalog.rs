use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Acquisition channel a lead arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadSource {
    #[serde(rename = "Google Ads")]
    GoogleAds,
    #[serde(rename = "LinkedIn")]
    LinkedIn,
    #[serde(rename = "Referrals")]
    Referrals,
    #[serde(rename = "SEO")]
    Seo,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Email")]
    Email,
}

impl LeadSource {
    pub const COUNT: usize = 6;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::GoogleAds,
            Self::LinkedIn,
            Self::Referrals,
            Self::Seo,
            Self::SocialMedia,
            Self::Email,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::GoogleAds => "Google Ads",
            Self::LinkedIn => "LinkedIn",
            Self::Referrals => "Referrals",
            Self::Seo => "SEO",
            Self::SocialMedia => "Social Media",
            Self::Email => "Email",
        }
    }

    /// Position of the channel in [`LeadSource::ordered`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "Corporate Law")]
    CorporateLaw,
    #[serde(rename = "Family Law")]
    FamilyLaw,
    #[serde(rename = "IP")]
    IntellectualProperty,
    #[serde(rename = "Litigation")]
    Litigation,
    #[serde(rename = "Real Estate")]
    RealEstate,
}

impl Industry {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::CorporateLaw,
            Self::FamilyLaw,
            Self::IntellectualProperty,
            Self::Litigation,
            Self::RealEstate,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CorporateLaw => "Corporate Law",
            Self::FamilyLaw => "Family Law",
            Self::IntellectualProperty => "IP",
            Self::Litigation => "Litigation",
            Self::RealEstate => "Real Estate",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Tier classification derived from a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub const HIGH_THRESHOLD: u8 = 70;
    pub const MEDIUM_THRESHOLD: u8 = 40;

    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub const fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Funnel stages in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadStage {
    Awareness,
    Interest,
    Booking,
    Consultation,
    Conversion,
}

impl LeadStage {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Awareness,
            Self::Interest,
            Self::Booking,
            Self::Consultation,
            Self::Conversion,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Awareness => "Awareness",
            Self::Interest => "Interest",
            Self::Booking => "Booking",
            Self::Consultation => "Consultation",
            Self::Conversion => "Conversion",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationPreference {
    Email,
    Phone,
    Chat,
}

impl CommunicationPreference {
    pub const COUNT: usize = 3;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [Self::Email, Self::Phone, Self::Chat]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Chat => "chat",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Raised when a label does not name a member of one of the fixed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct CatalogError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = CatalogError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                <$ty>::ordered()
                    .into_iter()
                    .find(|candidate| candidate.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| CatalogError {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(LeadSource, "channel");
labelled_enum!(Industry, "industry");
labelled_enum!(QualityTier, "quality tier");
labelled_enum!(LeadStage, "stage");
labelled_enum!(CommunicationPreference, "communication preference");

/// Sequential lead identifier rendered as `LEAD-00001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn sequential(ordinal: usize) -> Self {
        Self(format!("LEAD-{ordinal:05}"))
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single synthesized lead. Tier is always consistent with score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub source: LeadSource,
    pub date_created: DateTime<Utc>,
    pub firm_size: u32,
    pub industry: Industry,
    pub revenue_potential: u64,
    pub quality_score: u8,
    pub quality_tier: QualityTier,
    pub engagement_score: u8,
    pub stage: LeadStage,
    pub days_in_funnel: u16,
    pub converted: bool,
    pub cost_per_lead: u32,
    pub communication_preference: CommunicationPreference,
}

impl Lead {
    pub fn is_high_quality(&self) -> bool {
        self.quality_tier == QualityTier::High
    }

    /// Revenue credited to the lead: its potential when converted, otherwise zero.
    pub fn realized_revenue(&self) -> u64 {
        if self.converted {
            self.revenue_potential
        } else {
            0
        }
    }
}
