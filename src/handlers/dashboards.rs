use axum::extract::{Json, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

use super::AppState;
use crate::errors::{ErrorResponse, ServiceError};
use crate::queries::TenantDashboard;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TenantDashboardParams {
    /// Tenant email whose leases are listed; compared case-insensitively
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/tenant/dashboard",
    summary = "Tenant dashboard",
    description = "Recently listed available properties, top cities and the tenant's own leases",
    params(TenantDashboardParams),
    responses(
        (status = 200, description = "Dashboard", body = TenantDashboard),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "dashboards"
)]
pub async fn tenant_dashboard(
    State(state): State<AppState>,
    Query(params): Query<TenantDashboardParams>,
) -> Result<Json<TenantDashboard>, ServiceError> {
    Ok(Json(
        state
            .services
            .leases
            .tenant_dashboard(params.email.as_deref())
            .await?,
    ))
}
