use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{lease, owner, property, City, PropertyType};
use crate::services::availability::Availability;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OwnerView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<owner::Model> for OwnerView {
    fn from(model: owner::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            full_name: model.full_name,
            email: model.email,
            telephone: model.telephone,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: String,
    pub city: City,
    pub city_label: String,
    pub surface_area_m2: i32,
    pub monthly_rent: Decimal,
    pub property_type: PropertyType,
    pub disponible: bool,
    pub exige_validation_contrat: bool,
    pub created_at: DateTime<Utc>,
}

impl PropertyView {
    pub fn availability(&self) -> Availability {
        Availability::from(self.disponible)
    }
}

impl From<property::Model> for PropertyView {
    fn from(model: property::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            address: model.address,
            city_label: model.city.label().to_string(),
            city: model.city,
            surface_area_m2: model.surface_area_m2,
            monthly_rent: model.monthly_rent,
            property_type: model.property_type,
            disponible: model.disponible,
            exige_validation_contrat: model.exige_validation_contrat,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaseView {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_name: String,
    pub tenant_phone: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_notes: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deposit: Decimal,
    pub active: bool,
}

impl From<lease::Model> for LeaseView {
    fn from(model: lease::Model) -> Self {
        Self {
            id: model.id,
            property_id: model.property_id,
            tenant_name: model.tenant_name,
            tenant_phone: model.tenant_phone,
            tenant_email: model.tenant_email,
            tenant_notes: model.tenant_notes,
            start_date: model.start_date,
            end_date: model.end_date,
            deposit: model.deposit,
            active: model.active,
        }
    }
}

/// A lease with its property title and owner, as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult, ToSchema)]
pub struct LeaseListing {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_name: String,
    pub tenant_phone: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_notes: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deposit: Decimal,
    pub active: bool,
    pub property_title: String,
    pub owner_id: Uuid,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CityCount {
    pub city: City,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OwnerDashboard {
    pub owner: OwnerView,
    pub total_properties: u64,
    pub available_properties: u64,
    pub occupied_properties: u64,
    pub lease_requests: u64,
    /// Property count per city, largest first.
    pub cities: Vec<CityCount>,
    pub properties: Vec<PropertyView>,
    pub requests: Vec<LeaseListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantDashboard {
    pub recent_properties: Vec<PropertyView>,
    pub available_properties: u64,
    pub top_cities: Vec<CityCount>,
    pub leases: Vec<LeaseListing>,
}
