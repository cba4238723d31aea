use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::batch::{BatchCoordinator, BatchJobId};
use super::domain::UserId;
use super::repository::{MatchRepository, MatchingDirectory, TopMatchView};
use super::scoring::MatchScore;
use super::service::{MatchingError, MatchingService};

/// Shared handler state: the single-user service plus the batch coordinator built on it.
pub struct MatchingState<D, R> {
    pub service: Arc<MatchingService<D, R>>,
    pub batches: BatchCoordinator<D, R>,
}

impl<D, R> Clone for MatchingState<D, R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            batches: self.batches.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalculateMatchingResponse {
    pub user_id: UserId,
    pub matches: Vec<MatchScore>,
}

#[derive(Debug, Serialize)]
pub struct TopMatchesResponse {
    pub user_id: UserId,
    pub matches: Vec<TopMatchView>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopMatchesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchMatchingRequest {
    #[serde(default)]
    pub user_ids: Option<Vec<UserId>>,
}

/// Router builder exposing matching, ranking, and batch endpoints.
pub fn matching_router<D, R>(
    service: Arc<MatchingService<D, R>>,
    batches: BatchCoordinator<D, R>,
) -> Router
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/matching/users/:user_id/calculate",
            post(calculate_handler::<D, R>),
        )
        .route(
            "/api/v1/matching/users/:user_id/top",
            get(top_matches_handler::<D, R>),
        )
        .route("/api/v1/matching/batch", post(batch_handler::<D, R>))
        .route(
            "/api/v1/matching/batch/:job_id",
            get(batch_status_handler::<D, R>),
        )
        .with_state(MatchingState { service, batches })
}

pub(crate) async fn calculate_handler<D, R>(
    State(state): State<MatchingState<D, R>>,
    Path(user_id): Path<String>,
) -> Response
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    let user_id = UserId(user_id);
    match state.service.calculate_matching(&user_id) {
        Ok(matches) => {
            (StatusCode::OK, axum::Json(CalculateMatchingResponse { user_id, matches }))
                .into_response()
        }
        Err(error) => matching_error_response(error),
    }
}

pub(crate) async fn top_matches_handler<D, R>(
    State(state): State<MatchingState<D, R>>,
    Path(user_id): Path<String>,
    Query(query): Query<TopMatchesQuery>,
) -> Response
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    if query.limit == Some(0) {
        return error_response(StatusCode::BAD_REQUEST, "limit must be at least 1");
    }

    let user_id = UserId(user_id);
    match state.service.top_matches(&user_id, query.limit) {
        Ok(matches) => {
            (StatusCode::OK, axum::Json(TopMatchesResponse { user_id, matches })).into_response()
        }
        Err(error) => matching_error_response(error),
    }
}

/// A bodyless request (no JSON content type) covers every user; a body that fails to parse is a 400.
pub(crate) async fn batch_handler<D, R>(
    State(state): State<MatchingState<D, R>>,
    payload: Result<axum::Json<BatchMatchingRequest>, JsonRejection>,
) -> Response
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    let request = match payload {
        Ok(axum::Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => BatchMatchingRequest::default(),
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    match state.batches.start(request.user_ids) {
        Ok(ticket) => (StatusCode::ACCEPTED, axum::Json(ticket)).into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string()),
    }
}

pub(crate) async fn batch_status_handler<D, R>(
    State(state): State<MatchingState<D, R>>,
    Path(job_id): Path<String>,
) -> Response
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    let job_id = BatchJobId(job_id);
    match state.batches.status(&job_id) {
        Some(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("batch job {job_id} not found"),
        ),
    }
}

fn matching_error_response(error: MatchingError) -> Response {
    let status = if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let payload = json!({ "error": message });
    (status, axum::Json(payload)).into_response()
}
