//! HTTP routes.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use nfzq_core::{FilterQuery, Queue};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::QueuesService;

/// Raw query string of `GET /nfz/queues`.
///
/// Fields stay textual so that malformed numbers surface as query
/// violations rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuesParams {
    pub case: Option<String>,
    pub benefit_for_children: Option<String>,
    pub benefit: Option<String>,
    pub province: Option<String>,
    pub locality: Option<String>,
}

/// An empty parameter is treated as absent. Text is passed through verbatim.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl QueuesParams {
    /// Convert to a filter query, collecting every violated rule.
    pub fn into_query(self) -> Result<FilterQuery, ApiError> {
        // Unparseable numbers map to out-of-range values and fail validation below.
        let case = non_empty(self.case).and_then(|c| c.trim().parse::<u8>().ok()).unwrap_or(0);
        let province = non_empty(self.province).map(|p| p.trim().parse::<u8>().unwrap_or(0));

        let query = FilterQuery {
            case,
            benefit_for_children: non_empty(self.benefit_for_children).unwrap_or_default(),
            benefit: non_empty(self.benefit),
            province,
            locality: non_empty(self.locality),
        };

        let violations = query.violations();
        if violations.is_empty() { Ok(query) } else { Err(ApiError::invalid_query(&violations)) }
    }
}

/// Build the application router.
pub fn router(service: QueuesService) -> Router {
    Router::new()
        .route("/nfz/queues", get(list_queues))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn list_queues(
    State(service): State<QueuesService>, Query(params): Query<QueuesParams>,
) -> Result<Json<Vec<Queue>>, ApiError> {
    let query = params.into_query()?;
    tracing::debug!(?query, "listing queues");
    let queues = service.find_all(&query).await?;
    Ok(Json(queues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeGeocoder, FakeSource, queue};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use nfzq_core::{CacheDb, HardcodedGeocoder};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app(source: FakeSource) -> Router {
        let db = CacheDb::open_in_memory().await.unwrap();
        router(QueuesService::new(db, Arc::new(source), Arc::new(HardcodedGeocoder)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_params_into_query() {
        let params = QueuesParams {
            case: Some("1".to_string()),
            benefit_for_children: Some("FalSE".to_string()),
            benefit: Some("endokryno".to_string()),
            province: Some("12".to_string()),
            locality: Some(String::new()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query, FilterQuery::new(1, "FalSE").with_benefit("endokryno").with_province(12));
    }

    #[test]
    fn test_params_keep_text_filters_verbatim() {
        let params = QueuesParams {
            case: Some(" 2 ".to_string()),
            benefit_for_children: Some("true".to_string()),
            benefit: Some(" endo".to_string()),
            province: Some("06".to_string()),
            locality: Some("KRAKÓW ".to_string()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.case, 2);
        assert_eq!(query.benefit.as_deref(), Some(" endo"));
        assert_eq!(query.locality.as_deref(), Some("KRAKÓW "));
    }

    #[test]
    fn test_params_collect_all_violations() {
        let params = QueuesParams {
            case: Some("x".to_string()),
            benefit_for_children: None,
            province: Some("300".to_string()),
            ..Default::default()
        };
        let err = params.into_query().unwrap_err();
        let fields: Vec<&str> = err.body.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["case", "benefitForChildren", "province"]);
    }

    #[tokio::test]
    async fn test_list_queues_returns_geocoded_records() {
        let source = FakeSource::returning(vec![
            queue("1", "PORADNIA ENDOKRYNOLOGICZNA", "KATOWICE", "2469011"),
            queue("2", "PORADNIA KARDIOLOGICZNA", "KATOWICE", "2469011"),
        ]);
        let (status, body) =
            get_json(app(source).await, "/nfz/queues?case=1&benefitForChildren=false&benefit=endo&province=12").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "1");
        assert_eq!(records[0]["attributes"]["latitude"], 42.0);
        assert_eq!(records[0]["attributes"]["longitude"], 1337.0);
        assert_eq!(records[1]["attributes"]["teryt-place"], "2469011");
    }

    #[tokio::test]
    async fn test_list_queues_rejects_locality_without_province() {
        let source = FakeSource::returning(Vec::new());
        let (status, body) =
            get_json(app(source.clone()).await, "/nfz/queues?case=1&benefitForChildren=false&locality=KATOWICE").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_query");
        assert_eq!(body["message"], "province must be specified when locality is specified");
        assert_eq!(body["violations"][0]["field"], "locality");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_list_queues_upstream_failure() {
        let (status, body) = get_json(app(FakeSource::failing()).await, "/nfz/queues?case=2&benefitForChildren=true").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "upstream_error");
        assert!(body["message"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_list_queues_tolerates_geocoder_failure() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let source = FakeSource::returning(vec![queue("1", "PORADNIA", "KATOWICE", "2469011")]);
        let app = router(QueuesService::new(db, Arc::new(source), Arc::new(FakeGeocoder::failing())));

        let (status, body) = get_json(app, "/nfz/queues?case=1&benefitForChildren=false").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body[0]["attributes"]["latitude"].is_null());
    }
}
