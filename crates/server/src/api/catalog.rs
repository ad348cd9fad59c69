use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use homerent_core::domain::amount;
use homerent_core::domain::appliance::{Appliance, ApplianceId, AppliancePatch, NewAppliance};
use homerent_core::recommend::{Budget, BudgetError, Recommendation, RecommendationRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ApplianceList {
    #[serde(rename = "Appliance")]
    pub appliances: Vec<Appliance>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplianceMutation {
    pub message: &'static str,
    pub appliance: Appliance,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub budget: Value,
}

#[derive(Debug, Serialize)]
pub struct RecommendationList {
    #[serde(with = "amount")]
    pub budget: Decimal,
    pub recommendations: Vec<Recommendation>,
}

pub async fn list_appliances(State(state): State<AppState>) -> Result<Json<ApplianceList>, ApiError> {
    let appliances = state.appliances.list().await?;
    if appliances.is_empty() {
        return Err(ApiError::not_found("No appliances found."));
    }
    Ok(Json(ApplianceList { appliances }))
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let keyword = query.keyword.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Err(ApiError::bad_request("Keyword is required"));
    }
    let names = state.appliances.suggest_names(keyword, state.catalog.suggestion_limit).await?;
    Ok(Json(names))
}

pub async fn insert_appliance(
    State(state): State<AppState>,
    Json(body): Json<NewAppliance>,
) -> Result<(StatusCode, Json<ApplianceMutation>), ApiError> {
    body.validate()?;
    let appliance = body.into_appliance(ApplianceId(Uuid::new_v4().to_string()));
    state.appliances.save(appliance.clone()).await?;

    info!(
        event_name = "catalog.appliance.created",
        correlation_id = %appliance.id,
        name = %appliance.name,
        "appliance added to catalog"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplianceMutation { message: "Appliance added successfully.", appliance }),
    ))
}

pub async fn update_appliance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AppliancePatch>,
) -> Result<Json<ApplianceMutation>, ApiError> {
    patch.validate()?;
    let id = ApplianceId(id);
    let Some(mut appliance) = state.appliances.find_by_id(&id).await? else {
        return Err(ApiError::not_found("Appliance not found."));
    };
    patch.apply_to(&mut appliance);
    state.appliances.save(appliance.clone()).await?;

    info!(event_name = "catalog.appliance.updated", correlation_id = %id, "appliance updated");
    Ok(Json(ApplianceMutation { message: "Appliance updated successfully", appliance }))
}

pub async fn delete_appliance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplianceMutation>, ApiError> {
    let id = ApplianceId(id);
    let appliance =
        state.appliances.delete(&id).await?.ok_or_else(|| ApiError::not_found("Appliance not found"))?;

    info!(event_name = "catalog.appliance.deleted", correlation_id = %id, "appliance deleted");
    Ok(Json(ApplianceMutation { message: "Appliance deleted successfully", appliance }))
}

/// Accepts the budget as a JSON string or number.
pub async fn recommendations(
    State(state): State<AppState>,
    Json(query): Json<RecommendationQuery>,
) -> Result<Json<RecommendationList>, ApiError> {
    let budget = parse_budget(&query.budget)?;
    let catalog = state.appliances.list().await?;
    let request =
        RecommendationRequest::new(budget).with_max_results(state.catalog.recommendation_limit);
    let recommendations = state.recommender.recommend(&request, &catalog);

    info!(
        event_name = "catalog.recommendations.served",
        correlation_id = "recommendations",
        budget = %budget.amount(),
        candidates = recommendations.len(),
        "budget recommendations computed"
    );
    Ok(Json(RecommendationList { budget: budget.amount(), recommendations }))
}

fn parse_budget(raw: &Value) -> Result<Budget, BudgetError> {
    match raw {
        Value::String(text) => Budget::parse(text),
        Value::Number(number) => Budget::parse(&number.to_string()),
        Value::Null => Err(BudgetError::Empty),
        _ => Err(BudgetError::NotNumeric),
    }
}
