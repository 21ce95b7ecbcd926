use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{AppState, SearchParams};
use crate::auth::Actor;
use crate::commands::properties::PropertyInput;
use crate::errors::{ErrorResponse, ServiceError};
use crate::queries::PropertyView;
use crate::services::availability::AvailabilityChange;

/// Context of the lease form asking for property choices.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SelectableParams {
    /// Owner picked on the form
    pub owner_id: Option<Uuid>,
    /// Lease being edited, if any
    pub lease_id: Option<Uuid>,
}

fn views(properties: Vec<crate::entities::PropertyModel>) -> Vec<PropertyView> {
    properties.into_iter().map(PropertyView::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/properties",
    summary = "List properties",
    description = "Properties newest first, optionally filtered on title or city",
    params(SearchParams),
    responses(
        (status = 200, description = "Properties retrieved successfully", body = Vec<PropertyView>),
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PropertyView>>, ServiceError> {
    let properties = state
        .services
        .properties
        .search_properties(params.q.as_deref())
        .await?;
    Ok(Json(views(properties)))
}

#[utoipa::path(
    get,
    path = "/api/v1/properties/selectable",
    summary = "Properties selectable on a lease form",
    description = "Available properties of the chosen owner plus the property of the lease being edited",
    params(SelectableParams),
    responses(
        (status = 200, description = "Selectable properties", body = Vec<PropertyView>),
        (status = 404, description = "Lease not found", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn selectable_properties(
    State(state): State<AppState>,
    Query(params): Query<SelectableParams>,
) -> Result<Json<Vec<PropertyView>>, ServiceError> {
    let properties = state
        .services
        .properties
        .selectable_properties(params.owner_id, params.lease_id)
        .await?;
    Ok(Json(views(properties)))
}

#[utoipa::path(
    post,
    path = "/api/v1/properties",
    summary = "Create property",
    request_body = PropertyInput,
    responses(
        (status = 201, description = "Property created, available until leased", body = PropertyView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<PropertyInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let property = state
        .services
        .properties
        .create_property(actor, input)
        .await?;
    Ok((StatusCode::CREATED, Json(PropertyView::from(property))))
}

#[utoipa::path(
    get,
    path = "/api/v1/properties/{id}",
    summary = "Get property",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property retrieved successfully", body = PropertyView),
        (status = 404, description = "Property not found", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyView>, ServiceError> {
    let property = state.services.properties.get_property(id).await?;
    Ok(Json(property.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/properties/{id}",
    summary = "Update property",
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = PropertyInput,
    responses(
        (status = 200, description = "Property updated", body = PropertyView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<PropertyInput>,
) -> Result<Json<PropertyView>, ServiceError> {
    let property = state
        .services
        .properties
        .update_property(actor, id, input)
        .await?;
    Ok(Json(property.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/properties/{id}",
    summary = "Delete property",
    description = "Deletes the property and its leases",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.properties.delete_property(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/properties/reconcile",
    summary = "Re-derive availability",
    description = "Recomputes the availability flag of every property from its leases. Staff only.",
    responses(
        (status = 200, description = "Flags that were corrected", body = Vec<AvailabilityChange>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
    ),
    tag = "properties"
)]
pub async fn reconcile_properties(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<AvailabilityChange>>, ServiceError> {
    Ok(Json(state.services.properties.reconcile_all(actor).await?))
}
