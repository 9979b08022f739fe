use crate::catalog::LeadSource;
use serde::{Deserialize, Serialize};

/// Per-channel constants shared by the generator and the channel reducers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub channel: LeadSource,
    /// Base share of high-quality leads, in `[0, 1]`.
    pub high_quality_rate: f64,
    pub cost_per_lead: u32,
    pub monthly_spend: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EconomicsError {
    #[error("channel economics table has no entry for {0}")]
    MissingChannel(LeadSource),
    #[error("channel economics table lists {0} more than once")]
    DuplicateChannel(LeadSource),
    #[error("high quality rate {rate} for {channel} must lie within [0, 1]")]
    InvalidProfile { channel: LeadSource, rate: f64 },
}

/// Complete lookup table keyed by channel.
///
/// Construction rejects incomplete tables, so every enumerated channel resolves
/// and [`ChannelEconomics::profile`] cannot miss.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEconomics {
    profiles: [ChannelProfile; LeadSource::COUNT],
}

impl ChannelEconomics {
    pub fn standard() -> Self {
        Self {
            profiles: [
                profile(LeadSource::GoogleAds, 0.52, 85, 15_000),
                profile(LeadSource::LinkedIn, 0.48, 120, 12_000),
                profile(LeadSource::Referrals, 0.75, 50, 3_000),
                profile(LeadSource::Seo, 0.45, 40, 8_000),
                profile(LeadSource::SocialMedia, 0.22, 35, 5_000),
                profile(LeadSource::Email, 0.40, 25, 2_000),
            ],
        }
    }

    pub fn from_profiles<I>(profiles: I) -> Result<Self, EconomicsError>
    where
        I: IntoIterator<Item = ChannelProfile>,
    {
        let mut slots: [Option<ChannelProfile>; LeadSource::COUNT] = [None; LeadSource::COUNT];

        for entry in profiles {
            if !(0.0..=1.0).contains(&entry.high_quality_rate) {
                return Err(EconomicsError::InvalidProfile {
                    channel: entry.channel,
                    rate: entry.high_quality_rate,
                });
            }
            let slot = &mut slots[entry.channel.index()];
            if slot.is_some() {
                return Err(EconomicsError::DuplicateChannel(entry.channel));
            }
            *slot = Some(entry);
        }

        let mut resolved = Self::standard().profiles;
        for source in LeadSource::ordered() {
            resolved[source.index()] =
                slots[source.index()].ok_or(EconomicsError::MissingChannel(source))?;
        }

        Ok(Self { profiles: resolved })
    }

    pub fn profile(&self, source: LeadSource) -> &ChannelProfile {
        &self.profiles[source.index()]
    }

    /// Profiles in channel enumeration order.
    pub fn profiles(&self) -> &[ChannelProfile] {
        &self.profiles
    }

    /// Combined monthly spend across every channel.
    pub fn total_monthly_spend(&self) -> u64 {
        self.profiles.iter().map(|entry| entry.monthly_spend).sum()
    }
}

impl Default for ChannelEconomics {
    fn default() -> Self {
        Self::standard()
    }
}

const fn profile(
    channel: LeadSource,
    high_quality_rate: f64,
    cost_per_lead: u32,
    monthly_spend: u64,
) -> ChannelProfile {
    ChannelProfile {
        channel,
        high_quality_rate,
        cost_per_lead,
        monthly_spend,
    }
}
