use lead_quality::analytics::{
    DisplayScale, PartnerPeriod, PipelinePeriod, TimePeriod, ViewKind, YearMonth,
};
use lead_quality::config::{ConfigError, EngineConfig};
use lead_quality::error::AppError;
use lead_quality::generator::{snapshot, LeadPopulation, LeadSynthesizer};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only engine defaults shared by the lead routes.
#[derive(Debug, Clone, Default)]
pub(crate) struct LeadSettings {
    pub(crate) engine: EngineConfig,
}

impl LeadSettings {
    pub(crate) fn new(engine: EngineConfig) -> Self {
        Self { engine }
    }

    /// Generates a fresh population, falling back to the configured size and
    /// seed when the caller does not supply them.
    pub(crate) fn generate(
        &self,
        count: Option<usize>,
        seed: Option<u64>,
    ) -> Result<LeadPopulation, ConfigError> {
        let count =
            EngineConfig::checked_population_size(count.unwrap_or(self.engine.population_size))?;
        let seed = seed.or(self.engine.seed);
        Ok(LeadSynthesizer::default().generate(count, seed))
    }
}

/// Runs CPU-bound population work on the blocking pool so request handlers
/// never stall the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?
}

pub(crate) fn load_population(
    settings: &LeadSettings,
    snapshot_path: Option<&Path>,
    count: Option<usize>,
    seed: Option<u64>,
) -> Result<LeadPopulation, AppError> {
    match snapshot_path {
        Some(path) => {
            let population = snapshot::import_from_path(path, None)?;
            debug!(path = %path.display(), leads = population.len(), "loaded lead snapshot");
            Ok(population)
        }
        None => Ok(settings.generate(count, seed)?),
    }
}

pub(crate) fn parse_month(raw: &str) -> Result<YearMonth, String> {
    raw.parse::<YearMonth>()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}

pub(crate) fn parse_period(raw: &str) -> Result<TimePeriod, String> {
    raw.parse::<TimePeriod>().map_err(|err| err.to_string())
}

pub(crate) fn parse_partner_period(raw: &str) -> Result<PartnerPeriod, String> {
    raw.parse::<PartnerPeriod>().map_err(|err| {
        let known: Vec<&str> = PartnerPeriod::ordered()
            .iter()
            .map(|period| period.label())
            .collect();
        format!("{err}; expected one of: {}", known.join(", "))
    })
}

pub(crate) fn parse_pipeline_period(raw: &str) -> Result<PipelinePeriod, String> {
    raw.parse::<PipelinePeriod>().map_err(|err| {
        let known: Vec<&str> = PipelinePeriod::ordered()
            .iter()
            .map(|period| period.label())
            .collect();
        format!("{err}; expected one of: {}", known.join(", "))
    })
}

pub(crate) fn parse_multiplier(raw: &str) -> Result<DisplayScale, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as a number ({err})"))?;
    DisplayScale::new(value).map_err(|err| err.to_string())
}

pub(crate) fn parse_view(raw: &str) -> Result<ViewKind, String> {
    raw.parse::<ViewKind>().map_err(|err| {
        let known: Vec<&str> = ViewKind::ordered().iter().map(|kind| kind.label()).collect();
        format!("{err}; expected one of: {}", known.join(", "))
    })
}
