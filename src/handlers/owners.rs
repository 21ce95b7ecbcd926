use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::{AppState, SearchParams};
use crate::auth::Actor;
use crate::commands::owners::OwnerInput;
use crate::errors::{ErrorResponse, ServiceError};
use crate::queries::{LeaseListing, OwnerDashboard, OwnerView};

#[utoipa::path(
    get,
    path = "/api/v1/owners",
    summary = "List owners",
    description = "Owners ordered by full name, optionally filtered on name, email or telephone",
    params(SearchParams),
    responses(
        (status = 200, description = "Owners retrieved successfully", body = Vec<OwnerView>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn list_owners(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<OwnerView>>, ServiceError> {
    let owners = state
        .services
        .owners
        .search_owners(params.q.as_deref())
        .await?;
    Ok(Json(owners.into_iter().map(OwnerView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/owners",
    summary = "Create owner",
    request_body = OwnerInput,
    responses(
        (status = 201, description = "Owner created", body = OwnerView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "Identity already linked to another owner", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn create_owner(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<OwnerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let owner = state.services.owners.create_owner(actor, input).await?;
    Ok((StatusCode::CREATED, Json(OwnerView::from(owner))))
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/{id}",
    summary = "Get owner",
    params(("id" = Uuid, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Owner retrieved successfully", body = OwnerView),
        (status = 404, description = "Owner not found", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OwnerView>, ServiceError> {
    let owner = state.services.owners.get_owner(id).await?;
    Ok(Json(owner.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/owners/{id}",
    summary = "Update owner",
    params(("id" = Uuid, Path, description = "Owner ID")),
    request_body = OwnerInput,
    responses(
        (status = 200, description = "Owner updated", body = OwnerView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse),
        (status = 409, description = "Identity already linked to another owner", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<OwnerInput>,
) -> Result<Json<OwnerView>, ServiceError> {
    let owner = state.services.owners.update_owner(actor, id, input).await?;
    Ok(Json(owner.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/owners/{id}",
    summary = "Delete owner",
    description = "Deletes the owner together with their properties and those properties' leases",
    params(("id" = Uuid, Path, description = "Owner ID")),
    responses(
        (status = 204, description = "Owner deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.owners.delete_owner(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/{id}/dashboard",
    summary = "Owner dashboard",
    params(("id" = Uuid, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Portfolio summary", body = OwnerDashboard),
        (status = 404, description = "Owner not found", body = ErrorResponse),
    ),
    tag = "dashboards"
)]
pub async fn owner_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OwnerDashboard>, ServiceError> {
    Ok(Json(state.services.owners.dashboard(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/{id}/leases",
    summary = "Lease requests for an owner",
    params(("id" = Uuid, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Leases on the owner's properties, newest start first", body = Vec<LeaseListing>),
        (status = 404, description = "Owner not found", body = ErrorResponse),
    ),
    tag = "owners"
)]
pub async fn owner_lease_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LeaseListing>>, ServiceError> {
    Ok(Json(state.services.owners.lease_requests(id).await?))
}
