use crate::infra::{
    load_population, parse_month, parse_multiplier, parse_partner_period, parse_period,
    parse_pipeline_period, parse_view, LeadSettings,
};
use clap::Args;
use lead_quality::analytics::{
    AnalyticsView, DisplayJitter, DisplayOptions, DisplayScale, FilterConfig, PartnerPeriod,
    PipelinePeriod, TierCounts, TimePeriod, ViewEnvelope, ViewKind, YearMonth,
};
use lead_quality::error::AppError;
use lead_quality::generator::snapshot;
use std::fmt::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Number of leads to synthesize (defaults to LEAD_POPULATION_SIZE)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Seed for a reproducible population (defaults to LEAD_SEED)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Analyse a CSV snapshot instead of synthesizing leads
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Time period filter: last-3-months, last-6-months, last-12-months or month-by-month
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Option<TimePeriod>,
    /// Month (YYYY-MM) used with the month-by-month period
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: Option<YearMonth>,
    /// View to compute; repeat for several. Defaults to every view.
    #[arg(long = "view", value_parser = parse_view)]
    pub(crate) views: Vec<ViewKind>,
    /// Multiplier applied to the partner scorecard and sales pipeline tables
    #[arg(long, value_parser = parse_multiplier)]
    pub(crate) display_multiplier: Option<DisplayScale>,
    /// Reporting period for the partner scorecards: last-90-days, year-to-date or last-12-months
    #[arg(long, value_parser = parse_partner_period)]
    pub(crate) partner_period: Option<PartnerPeriod>,
    /// Reporting period for the sales pipeline: last-7, last-30, last-90, year-to-date or all-time
    #[arg(long, value_parser = parse_pipeline_period)]
    pub(crate) pipeline_period: Option<PipelinePeriod>,
    /// Seed for reproducible jitter on the partner and pipeline tables
    #[arg(long)]
    pub(crate) jitter_seed: Option<u64>,
    /// Relative jitter spread used with --jitter-seed
    #[arg(long, default_value_t = 0.1)]
    pub(crate) jitter_spread: f64,
    /// Emit the view envelopes as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Destination CSV file
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Number of leads to synthesize (defaults to LEAD_POPULATION_SIZE)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Seed for a reproducible population (defaults to LEAD_SEED)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) fn run_report(settings: &LeadSettings, args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        count,
        seed,
        snapshot,
        period,
        month,
        views,
        display_multiplier,
        partner_period,
        pipeline_period,
        jitter_seed,
        jitter_spread,
        json,
    } = args;

    let population = load_population(settings, snapshot.as_deref(), count, seed)?;
    let filter = FilterConfig::new(period.unwrap_or_default(), month);
    let filtered = filter.apply(&population);

    let display = DisplayOptions {
        scale: display_multiplier.unwrap_or_default(),
        jitter: jitter_seed
            .map(|seed| DisplayJitter::new(seed, jitter_spread))
            .transpose()?,
    };
    let mut engine = settings.engine.analytics_engine().with_display(display);
    if let Some(period) = partner_period {
        engine = engine.with_partner_period(period);
    }
    if let Some(period) = pipeline_period {
        engine = engine.with_pipeline_period(period);
    }

    let kinds = if views.is_empty() {
        ViewKind::ordered().to_vec()
    } else {
        views
    };
    let envelopes = engine.compute_many(&kinds, &filtered);

    info!(
        leads = population.len(),
        filtered = filtered.len(),
        period = %filter.period,
        views = envelopes.len(),
        "rendering lead quality report"
    );

    if json {
        let rendered = serde_json::to_string_pretty(&envelopes).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Lead quality report ({} of {} leads, period {})",
        filtered.len(),
        population.len(),
        filter.period
    );
    if let Some(seed) = population.seed() {
        println!("Seed: {seed}");
    }
    println!("{}", render_report(&envelopes).map_err(format_error)?);
    Ok(())
}

pub(crate) fn run_export(settings: &LeadSettings, args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        output,
        count,
        seed,
    } = args;

    let population = settings.generate(count, seed)?;
    snapshot::export_to_path(&population, &output)?;

    info!(path = %output.display(), leads = population.len(), "exported lead snapshot");
    println!(
        "Exported {} leads to {}",
        population.len(),
        output.display()
    );
    Ok(())
}

fn format_error(_: fmt::Error) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "failed to format report",
    ))
}

pub(crate) fn render_report(envelopes: &[ViewEnvelope]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for envelope in envelopes {
        writeln!(out)?;
        writeln!(out, "== {} ==", envelope.view.kind())?;
        render_view(&mut out, &envelope.view)?;
    }
    Ok(out)
}

fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

fn tiers(counts: &TierCounts) -> String {
    format!(
        "high {} | medium {} | low {}",
        counts.high, counts.medium, counts.low
    )
}

fn render_view<W: Write>(out: &mut W, view: &AnalyticsView) -> fmt::Result {
    match view {
        AnalyticsView::SummaryMetrics(summary) => {
            writeln!(
                out,
                "- {} leads | avg score {} | {} conversion",
                summary.total_leads,
                summary.avg_quality_score,
                pct(summary.conversion_rate)
            )?;
            writeln!(
                out,
                "- high {} ({}) | medium {} ({}) | low {} ({})",
                summary.high_quality_leads,
                pct(summary.high_quality_percentage),
                summary.medium_quality_leads,
                pct(summary.medium_quality_percentage),
                summary.low_quality_leads,
                pct(summary.low_quality_percentage)
            )?;
            writeln!(
                out,
                "- high quality conversion {} (predicted {}) | ${} per high quality lead",
                pct(summary.high_quality_conversion_rate),
                pct(summary.predicted_conversion_rate),
                summary.cost_per_high_quality_lead
            )
        }
        AnalyticsView::LeadSegmentation(segmentation) => {
            for (label, share) in [
                ("High", &segmentation.high),
                ("Medium", &segmentation.medium),
                ("Low", &segmentation.low),
            ] {
                writeln!(
                    out,
                    "- {label}: {} ({})",
                    share.count,
                    pct(share.percentage)
                )?;
            }
            writeln!(out, "- Total: {}", segmentation.total)
        }
        AnalyticsView::QualityScoreDistribution(bins) => {
            for bin in bins {
                writeln!(out, "  {:>6}: {}", bin.range, bin.count)?;
            }
            Ok(())
        }
        AnalyticsView::HighQualityProfile(profile) => {
            writeln!(
                out,
                "- {} high quality leads | {} conversion",
                profile.sample_size,
                pct(profile.conversion_rate)
            )?;
            writeln!(
                out,
                "- avg firm size {} | industry {} | engagement {}",
                profile.avg_firm_size, profile.most_common_industry, profile.avg_engagement_score
            )?;
            writeln!(
                out,
                "- prefers {} | {} days in funnel",
                profile.top_communication_channel, profile.avg_days_in_funnel
            )
        }
        AnalyticsView::FeatureImportance(features) => {
            for feature in features {
                writeln!(out, "- {}: {}", feature.feature, feature.importance)?;
            }
            Ok(())
        }
        AnalyticsView::SourceVsQuality(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: {} (total {})",
                    row.channel,
                    tiers(&row.counts),
                    row.total
                )?;
            }
            Ok(())
        }
        AnalyticsView::FunnelByQuality(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: {} (total {})",
                    row.stage,
                    tiers(&row.counts),
                    row.total
                )?;
            }
            Ok(())
        }
        AnalyticsView::ChannelMetrics(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: {} leads | {} high quality | {} conversion | ${:.2} per HQ lead | ROI {:.1}%",
                    row.channel,
                    row.volume,
                    pct(row.high_quality_percentage),
                    pct(row.conversion_rate),
                    row.cost_per_high_quality_lead,
                    row.roi
                )?;
            }
            Ok(())
        }
        AnalyticsView::MarketingRoi(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: spend ${} | revenue ${} | ROI {}% | {} converted of {}",
                    row.channel,
                    row.spend,
                    row.revenue,
                    row.roi,
                    row.converted_leads,
                    row.lead_volume
                )?;
            }
            Ok(())
        }
        AnalyticsView::CostPerLead(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: ${} per lead | ${} per HQ lead | {} efficient",
                    row.channel, row.cost_per_lead_all, row.cost_per_lead_hq, row.efficiency
                )?;
            }
            Ok(())
        }
        AnalyticsView::SpendVsReturn(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: spend ${} | return ${} | profit ${}",
                    row.channel, row.spend, row.returned, row.profitability
                )?;
            }
            Ok(())
        }
        AnalyticsView::CampaignQuadrant(points) => {
            for point in points {
                writeln!(
                    out,
                    "- {}: {} | ${} per HQ lead | {} conversion | {} leads",
                    point.channel,
                    point.quadrant.label(),
                    point.x,
                    pct(point.y),
                    point.size
                )?;
            }
            Ok(())
        }
        AnalyticsView::AcquisitionEconomics(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: CAC ${} | LTV ${} | LTV:CAC {:.1} | ROAS {:.2} | payback {:.1} months",
                    row.channel, row.cac, row.ltv, row.ltv_cac, row.roas, row.payback_months
                )?;
            }
            Ok(())
        }
        AnalyticsView::QualityHeatmap(cells) => {
            for day in cells.chunks(24) {
                let Some(first) = day.first() else {
                    continue;
                };
                let scores: Vec<String> = day.iter().map(|cell| cell.score.to_string()).collect();
                writeln!(out, "  {:<9} {}", first.day, scores.join(" "))?;
            }
            Ok(())
        }
        AnalyticsView::QualityTrendLine(weeks) => {
            for week in weeks {
                writeln!(out, "- {}: {}", week.week, tiers(&week.counts))?;
            }
            Ok(())
        }
        AnalyticsView::MonthlyTrend(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: {} leads ({} HQ) | revenue ${} | spend ${} | ROI {}% | {}% conversion",
                    row.month,
                    row.leads,
                    row.high_quality_leads,
                    row.revenue,
                    row.spend,
                    row.roi,
                    row.conversion_rate
                )?;
            }
            Ok(())
        }
        AnalyticsView::IndustryPerformance(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "- {}: {} leads | {} HQ | {} conversion | revenue ${} | avg potential ${}",
                    row.industry,
                    row.volume,
                    pct(row.high_quality_percentage),
                    pct(row.conversion_rate),
                    row.revenue,
                    row.avg_revenue_potential
                )?;
            }
            Ok(())
        }
        AnalyticsView::PartnerScorecards(cards) => {
            for card in cards {
                writeln!(
                    out,
                    "- {}: revenue ${} | profit ${} ({}) | {} new clients | pipeline ${} ({:.1}x)",
                    card.partner,
                    card.partner_revenue,
                    card.matter_profit,
                    pct(card.profit_margin),
                    card.new_clients,
                    card.bd_pipeline_value,
                    card.pipeline_coverage
                )?;
            }
            Ok(())
        }
        AnalyticsView::SalesPipeline(pipeline) => {
            for customer in &pipeline.customers {
                writeln!(
                    out,
                    "- {}: ${} ({})",
                    customer.name,
                    customer.revenue,
                    pct(customer.revenue_share)
                )?;
            }
            writeln!(
                out,
                "- total ${} across {} customers | {} products | ${} per customer",
                pipeline.total_revenue,
                pipeline.customer_count,
                pipeline.products_sold,
                pipeline.average_revenue_per_customer
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_quality::analytics::AnalyticsEngine;
    use lead_quality::generator::LeadSynthesizer;

    #[test]
    fn renders_every_view_with_a_heading() {
        let population = LeadSynthesizer::default().generate(120, Some(4));
        let envelopes = AnalyticsEngine::default().compute_all(&population);

        let rendered = render_report(&envelopes).expect("formatting succeeds");

        for kind in ViewKind::ordered() {
            assert!(
                rendered.contains(&format!("== {} ==", kind)),
                "missing section for {kind}"
            );
        }
        assert!(rendered.contains("Visionary Enterprises"));
    }

    #[test]
    fn renders_empty_population_without_panicking() {
        let population = LeadSynthesizer::default().generate(0, Some(1));
        let envelopes = AnalyticsEngine::default().compute_all(&population);

        let rendered = render_report(&envelopes).expect("formatting succeeds");

        assert!(rendered.contains("- Total: 0"));
    }

    #[test]
    fn export_writes_a_snapshot_that_loads_back() {
        let path = std::env::temp_dir().join(format!(
            "lead-quality-export-{}.csv",
            std::process::id()
        ));
        let settings = LeadSettings::default();

        run_export(
            &settings,
            ExportArgs {
                output: path.clone(),
                count: Some(25),
                seed: Some(8),
            },
        )
        .expect("export succeeds");

        let population =
            load_population(&settings, Some(path.as_path()), None, None).expect("import succeeds");
        let _ = std::fs::remove_file(&path);

        assert_eq!(population.len(), 25);
    }

    #[test]
    fn invalid_jitter_spread_is_rejected() {
        let args = ReportArgs {
            count: Some(10),
            seed: Some(1),
            jitter_seed: Some(3),
            jitter_spread: 1.5,
            views: vec![ViewKind::SalesPipeline],
            ..ReportArgs::default()
        };

        let err = run_report(&LeadSettings::default(), args).expect_err("spread out of range");
        assert!(matches!(err, AppError::Filter(_)));
    }
}
