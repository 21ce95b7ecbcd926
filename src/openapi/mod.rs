use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Realty API",
        version = "1.0.0",
        description = r#"
# Realty API

Owners list properties; tenants submit lease requests on them.

A property is available exactly when it has no active lease, and a property
never carries more than one active lease. Every lease write re-derives the
availability of the properties it touches in the same transaction.

## Identity

Authentication is handled by the gateway in front of this service. It forwards
the acting user as `X-Actor-Id` (UUID) and marks staff with `X-Actor-Staff: true`.
Reads are public; writes require an actor.

## Error Handling

```json
{
  "error": "Validation Error",
  "message": "end_date: End date must be after the start date.",
  "fields": { "end_date": ["End date must be after the start date."] },
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "owners", description = "Owner management endpoints"),
        (name = "properties", description = "Property listing endpoints"),
        (name = "leases", description = "Lease submission endpoints"),
        (name = "dashboards", description = "Owner and tenant dashboards"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Owners
        crate::handlers::owners::list_owners,
        crate::handlers::owners::create_owner,
        crate::handlers::owners::get_owner,
        crate::handlers::owners::update_owner,
        crate::handlers::owners::delete_owner,
        crate::handlers::owners::owner_dashboard,
        crate::handlers::owners::owner_lease_requests,

        // Properties
        crate::handlers::properties::list_properties,
        crate::handlers::properties::selectable_properties,
        crate::handlers::properties::create_property,
        crate::handlers::properties::get_property,
        crate::handlers::properties::update_property,
        crate::handlers::properties::delete_property,
        crate::handlers::properties::reconcile_properties,

        // Leases
        crate::handlers::leases::list_leases,
        crate::handlers::leases::submit_lease,
        crate::handlers::leases::get_lease,
        crate::handlers::leases::update_lease,
        crate::handlers::leases::delete_lease,

        crate::handlers::dashboards::tenant_dashboard,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::commands::owners::OwnerInput,
            crate::commands::properties::PropertyInput,
            crate::commands::leases::LeaseInput,
            crate::queries::OwnerView,
            crate::queries::PropertyView,
            crate::queries::LeaseView,
            crate::queries::LeaseListing,
            crate::queries::CityCount,
            crate::queries::OwnerDashboard,
            crate::queries::TenantDashboard,
            crate::entities::City,
            crate::entities::PropertyType,
            crate::services::availability::Availability,
            crate::services::availability::AvailabilityChange,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
