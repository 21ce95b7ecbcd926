use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::{AppState, SearchParams};
use crate::auth::Actor;
use crate::commands::leases::LeaseInput;
use crate::errors::{ErrorResponse, ServiceError};
use crate::queries::{LeaseListing, LeaseView};

#[utoipa::path(
    get,
    path = "/api/v1/leases",
    summary = "List leases",
    description = "Leases newest start first, optionally filtered on tenant name, property title or owner name",
    params(SearchParams),
    responses(
        (status = 200, description = "Leases retrieved successfully", body = Vec<LeaseListing>),
    ),
    tag = "leases"
)]
pub async fn list_leases(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LeaseListing>>, ServiceError> {
    Ok(Json(
        state
            .services
            .leases
            .search_leases(params.q.as_deref())
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/leases",
    summary = "Submit lease",
    description = "Submits a lease request. The property owner is notified after the lease is stored.",
    request_body = LeaseInput,
    responses(
        (status = 201, description = "Lease stored", body = LeaseView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Owner or property not found", body = ErrorResponse),
        (status = 422, description = "Lease rules violated", body = ErrorResponse),
    ),
    tag = "leases"
)]
pub async fn submit_lease(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<LeaseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let lease = state.services.leases.submit_lease(actor, input).await?;
    Ok((StatusCode::CREATED, Json(LeaseView::from(lease))))
}

#[utoipa::path(
    get,
    path = "/api/v1/leases/{id}",
    summary = "Get lease",
    params(("id" = Uuid, Path, description = "Lease ID")),
    responses(
        (status = 200, description = "Lease retrieved successfully", body = LeaseView),
        (status = 404, description = "Lease not found", body = ErrorResponse),
    ),
    tag = "leases"
)]
pub async fn get_lease(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaseView>, ServiceError> {
    let lease = state.services.leases.get_lease(id).await?;
    Ok(Json(lease.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/leases/{id}",
    summary = "Update lease",
    description = "Edits a lease, possibly moving it to another property. Both properties are reconciled.",
    params(("id" = Uuid, Path, description = "Lease ID")),
    request_body = LeaseInput,
    responses(
        (status = 200, description = "Lease updated", body = LeaseView),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Lease, owner or property not found", body = ErrorResponse),
        (status = 422, description = "Lease rules violated", body = ErrorResponse),
    ),
    tag = "leases"
)]
pub async fn update_lease(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(input): Json<LeaseInput>,
) -> Result<Json<LeaseView>, ServiceError> {
    let lease = state.services.leases.update_lease(actor, id, input).await?;
    Ok(Json(lease.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leases/{id}",
    summary = "Delete lease",
    params(("id" = Uuid, Path, description = "Lease ID")),
    responses(
        (status = 204, description = "Lease deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Lease not found", body = ErrorResponse),
    ),
    tag = "leases"
)]
pub async fn delete_lease(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.leases.delete_lease(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
