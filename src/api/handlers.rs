use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        GearCategory, RecommendationRequest, RecommendationResponse, RecommendedGear,
        RefreshResponse, ScoredCandidate, UserPreferences, VariantsResponse,
    },
    services::RecommendationQuery,
};

/// Header carrying the admin token, as an alternative to a bearer token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const INSUFFICIENT_DATA_MESSAGE: &str = "Failed to refresh rules - insufficient data";

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedInput(rejection.body_text()))
}

/// Complementary gear for the current selection
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = parse_body(payload)?;

    tracing::info!(
        request_id = %request_id,
        selected = request.gear_ids.len(),
        excluded = request.exclude_types.len(),
        "Recommendation request"
    );

    let query = RecommendationQuery {
        selected: request.gear_ids,
        top_n: request.top_n,
        exclude: request.exclude_types,
    };
    let recommendations: Vec<RecommendedGear> = state
        .engine
        .recommend(&query)
        .await?
        .iter()
        .map(RecommendedGear::from)
        .collect();

    Ok(Json(RecommendationResponse {
        success: true,
        count: recommendations.len(),
        recommendations,
    }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(AppError::Forbidden("Rule refresh is disabled".to_string()));
    };

    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
        });

    match presented {
        Some(token) if token.trim() == expected => Ok(()),
        _ => Err(AppError::Forbidden("Admin token required".to_string())),
    }
}

/// Remines the rule set and overwrites the cache (privileged)
pub async fn refresh_rules(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> AppResult<(StatusCode, Json<RefreshResponse>)> {
    authorize(&state, &headers)?;

    match state.engine.refresh_rules().await {
        Ok(rule_set) => {
            tracing::info!(
                request_id = %request_id,
                rules = rule_set.rules.len(),
                "Rules refreshed"
            );
            Ok((
                StatusCode::OK,
                Json(RefreshResponse {
                    success: true,
                    message: "Association rules refreshed".to_string(),
                    rule_count: Some(rule_set.rules.len()),
                    transaction_count: Some(rule_set.transaction_count),
                }),
            ))
        }
        Err(AppError::InsufficientData(reason)) => {
            tracing::warn!(request_id = %request_id, reason = %reason, "Rule refresh failed");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(RefreshResponse {
                    success: false,
                    message: INSUFFICIENT_DATA_MESSAGE.to_string(),
                    rule_count: None,
                    transaction_count: None,
                }),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Performance, Balanced and Pro rigs for the given preferences
pub async fn variant_setups(
    State(state): State<AppState>,
    payload: Result<Json<UserPreferences>, JsonRejection>,
) -> AppResult<Json<VariantsResponse>> {
    let prefs = parse_body(payload)?;
    let variants = state.composer.compose(&prefs).await?;
    Ok(Json(VariantsResponse { variants }))
}

/// Top candidates of one category for the given preferences
pub async fn rank_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    payload: Result<Json<UserPreferences>, JsonRejection>,
) -> AppResult<Json<Vec<ScoredCandidate>>> {
    let category: GearCategory = category.parse().map_err(AppError::InvalidInput)?;
    let prefs = parse_body(payload)?;
    let ranked = state.composer.rank_category(&prefs, category).await?;
    Ok(Json(ranked))
}
