use crate::infra::{run_blocking, AppState, LeadSettings};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use lead_quality::analytics::{
    DisplayOptions, FilterConfig, PartnerPeriod, PipelinePeriod, ViewEnvelope, ViewKind,
};
use lead_quality::catalog::Lead;
use lead_quality::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PopulationRequest {
    #[serde(default)]
    pub(crate) count: Option<usize>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    #[serde(default)]
    pub(crate) filter: Option<FilterConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PopulationResponse {
    pub(crate) generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) seed: Option<u64>,
    pub(crate) count: usize,
    pub(crate) leads: Vec<Lead>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsRequest {
    #[serde(default)]
    pub(crate) count: Option<usize>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    #[serde(default)]
    pub(crate) filter: FilterConfig,
    #[serde(default)]
    pub(crate) display: DisplayOptions,
    /// Overrides the display multiplier for the partner scorecards.
    #[serde(default)]
    pub(crate) partner_period: Option<PartnerPeriod>,
    #[serde(default)]
    pub(crate) pipeline_period: Option<PipelinePeriod>,
    /// Views to compute; every view when empty.
    #[serde(default)]
    pub(crate) views: Vec<ViewKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsResponse {
    pub(crate) generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) seed: Option<u64>,
    pub(crate) population_size: usize,
    pub(crate) filtered_size: usize,
    pub(crate) filter: FilterConfig,
    pub(crate) views: Vec<ViewEnvelope>,
}

pub(crate) fn lead_routes(settings: LeadSettings) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/leads/population",
            axum::routing::post(population_endpoint),
        )
        .route(
            "/api/v1/leads/analytics",
            axum::routing::post(analytics_endpoint),
        )
        .layer(Extension(Arc::new(settings)))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn population_endpoint(
    Extension(settings): Extension<Arc<LeadSettings>>,
    Json(payload): Json<PopulationRequest>,
) -> Result<Json<PopulationResponse>, AppError> {
    let PopulationRequest {
        count,
        seed,
        filter,
    } = payload;

    let population = run_blocking(move || {
        let population = settings.generate(count, seed)?;
        Ok(match filter {
            Some(filter) => filter.apply(&population),
            None => population,
        })
    })
    .await?;

    info!(leads = population.len(), seeded = population.seed().is_some(), "served lead population");

    Ok(Json(PopulationResponse {
        generated_at: population.generated_at(),
        seed: population.seed(),
        count: population.len(),
        leads: population.into_leads(),
    }))
}

pub(crate) async fn analytics_endpoint(
    Extension(settings): Extension<Arc<LeadSettings>>,
    Json(payload): Json<AnalyticsRequest>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let AnalyticsRequest {
        count,
        seed,
        filter,
        display,
        partner_period,
        pipeline_period,
        views,
    } = payload;

    let kinds = if views.is_empty() {
        ViewKind::ordered().to_vec()
    } else {
        views
    };
    let (population, filtered, envelopes) = run_blocking(move || {
        let population = settings.generate(count, seed)?;
        let filtered = filter.apply(&population);
        let mut engine = settings.engine.analytics_engine().with_display(display);
        if let Some(period) = partner_period {
            engine = engine.with_partner_period(period);
        }
        if let Some(period) = pipeline_period {
            engine = engine.with_pipeline_period(period);
        }
        let envelopes = engine.compute_many(&kinds, &filtered);
        Ok((population, filtered, envelopes))
    })
    .await?;

    info!(
        leads = population.len(),
        filtered = filtered.len(),
        period = %filter.period,
        views = envelopes.len(),
        "computed lead analytics"
    );

    Ok(Json(AnalyticsResponse {
        generated_at: population.generated_at(),
        seed: population.seed(),
        population_size: population.len(),
        filtered_size: filtered.len(),
        filter,
        views: envelopes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::IntoResponse;
    use lead_quality::analytics::{AnalyticsView, DisplayScale, TimePeriod};
    use lead_quality::config::EngineConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn settings() -> Extension<Arc<LeadSettings>> {
        Extension(Arc::new(LeadSettings::new(EngineConfig {
            population_size: 200,
            seed: Some(11),
            ..EngineConfig::default()
        })))
    }

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    #[tokio::test]
    async fn population_endpoint_uses_configured_defaults() {
        let Json(body) = population_endpoint(settings(), Json(PopulationRequest::default()))
            .await
            .expect("population generated");

        assert_eq!(body.count, 200);
        assert_eq!(body.leads.len(), 200);
        assert_eq!(body.seed, Some(11));
        assert_eq!(body.leads[0].id.0, "LEAD-00001");
    }

    #[tokio::test]
    async fn population_endpoint_rejects_oversized_requests() {
        let request = PopulationRequest {
            count: Some(EngineConfig::MAX_POPULATION_SIZE + 1),
            ..PopulationRequest::default()
        };

        let err = population_endpoint(settings(), Json(request))
            .await
            .expect_err("too large");

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_endpoint_returns_requested_views() {
        let request = AnalyticsRequest {
            count: Some(300),
            seed: Some(5),
            views: vec![ViewKind::LeadSegmentation, ViewKind::SalesPipeline],
            display: DisplayOptions::scaled(DisplayScale::new(12.0).expect("valid scale")),
            ..AnalyticsRequest::default()
        };

        let Json(body) = analytics_endpoint(settings(), Json(request))
            .await
            .expect("analytics computed");

        assert_eq!(body.population_size, 300);
        assert!(body.filtered_size <= 300);
        assert_eq!(body.views.len(), 2);
        match &body.views[0].view {
            AnalyticsView::LeadSegmentation(segmentation) => {
                assert_eq!(segmentation.total, body.filtered_size);
            }
            other => panic!("unexpected view {:?}", other.kind()),
        }
        match &body.views[1].view {
            AnalyticsView::SalesPipeline(pipeline) => {
                assert_eq!(pipeline.customers[0].revenue, 252_000);
            }
            other => panic!("unexpected view {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn analytics_endpoint_is_stable_for_a_seed() {
        let request = || AnalyticsRequest {
            count: Some(150),
            seed: Some(99),
            filter: FilterConfig::new(TimePeriod::Last6Months, None),
            views: vec![ViewKind::SourceVsQuality, ViewKind::FunnelByQuality],
            ..AnalyticsRequest::default()
        };

        let Json(first) = analytics_endpoint(settings(), Json(request()))
            .await
            .expect("first run");
        let Json(second) = analytics_endpoint(settings(), Json(request()))
            .await
            .expect("second run");

        assert_eq!(first.filtered_size, second.filtered_size);
        assert_eq!(first.views[1], second.views[1]);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(app_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn router_serves_analytics_json() {
        let app = lead_routes(LeadSettings::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/leads/analytics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"count":50,"seed":3,"views":["source-vs-quality"],"filter":{"period":"last-12-months"}}"#,
            ))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(json["populationSize"], 50);
        assert_eq!(json["views"][0]["kind"], "source-vs-quality");
        assert_eq!(json["views"][0]["schemaVersion"], 1);
        assert_eq!(json["views"][0]["data"].as_array().map(Vec::len), Some(6));
    }

    #[tokio::test]
    async fn router_rejects_unknown_view_kind() {
        let app = lead_routes(LeadSettings::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/leads/analytics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"views":["pie-chart"]}"#))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn analytics_endpoint_applies_reporting_periods() {
        let request = AnalyticsRequest {
            count: Some(30),
            seed: Some(2),
            pipeline_period: Some(PipelinePeriod::AllTime),
            views: vec![ViewKind::SalesPipeline],
            ..AnalyticsRequest::default()
        };

        let Json(body) = analytics_endpoint(settings(), Json(request))
            .await
            .expect("analytics computed");

        match &body.views[0].view {
            AnalyticsView::SalesPipeline(pipeline) => {
                assert_eq!(pipeline.customers[0].revenue, 252_000);
                assert_eq!(pipeline.customer_count, 72);
            }
            other => panic!("unexpected view {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn router_accepts_partner_period_labels() {
        let app = lead_routes(LeadSettings::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/leads/analytics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"count":10,"views":["partner-scorecards"],"partnerPeriod":"year-to-date"}"#,
            ))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn router_rejects_invalid_jitter_spread() {
        let app = lead_routes(LeadSettings::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/leads/analytics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"count":20,"views":["partner-scorecards"],"display":{"jitter":{"seed":1,"spread":1e308}}}"#,
            ))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let app = lead_routes(LeadSettings::default());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
