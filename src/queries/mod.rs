//! Read side: search predicates, listings and dashboard aggregates.

pub mod views;

use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, IntoSimpleExpr, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{lease, owner, property, City};

pub use views::{
    CityCount, LeaseListing, LeaseView, OwnerDashboard, OwnerView, PropertyView, TenantDashboard,
};

/// Number of properties shown on the tenant dashboard.
pub const RECENT_PROPERTIES: u64 = 10;
/// Number of cities shown on the tenant dashboard.
pub const TOP_CITIES: usize = 5;

/// Trimmed, lower-cased search term; `None` for a blank query.
fn search_term(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Case-insensitive substring match of `column` against a lower-cased term.
fn icontains<C: IntoSimpleExpr>(column: C, term: &str) -> SimpleExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(column.into_simple_expr()))
        .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}

/// Owners by full name, optionally filtered on name, email or phone.
#[instrument(skip(db))]
pub async fn search_owners<C: ConnectionTrait>(
    db: &C,
    q: Option<&str>,
) -> Result<Vec<owner::Model>, DbErr> {
    let mut query = owner::Entity::find().order_by_asc(owner::Column::FullName);
    if let Some(term) = search_term(q) {
        query = query.filter(
            Condition::any()
                .add(icontains(owner::Column::FullName, &term))
                .add(icontains(owner::Column::Email, &term))
                .add(icontains(owner::Column::Telephone, &term)),
        );
    }
    query.all(db).await
}

/// Properties newest first, optionally filtered on title or city (slug or label).
#[instrument(skip(db))]
pub async fn search_properties<C: ConnectionTrait>(
    db: &C,
    q: Option<&str>,
) -> Result<Vec<property::Model>, DbErr> {
    let mut query = property::Entity::find()
        .order_by_desc(property::Column::CreatedAt)
        .order_by_asc(property::Column::Title);
    if let Some(term) = search_term(q) {
        let mut condition = Condition::any().add(icontains(property::Column::Title, &term));
        let cities = City::matching(&term);
        if !cities.is_empty() {
            condition = condition.add(property::Column::City.is_in(cities));
        }
        query = query.filter(condition);
    }
    query.all(db).await
}

fn lease_listing_query() -> Select<lease::Entity> {
    lease::Entity::find()
        .select_only()
        .columns([
            lease::Column::Id,
            lease::Column::PropertyId,
            lease::Column::TenantName,
            lease::Column::TenantPhone,
            lease::Column::TenantEmail,
            lease::Column::TenantNotes,
            lease::Column::StartDate,
            lease::Column::EndDate,
            lease::Column::Deposit,
            lease::Column::Active,
        ])
        .column_as(property::Column::Title, "property_title")
        .column_as(property::Column::OwnerId, "owner_id")
        .column_as(owner::Column::FullName, "owner_name")
        .join(JoinType::InnerJoin, lease::Relation::Property.def())
        .join(JoinType::InnerJoin, property::Relation::Owner.def())
        .order_by_desc(lease::Column::StartDate)
        .order_by_asc(lease::Column::TenantName)
}

/// Leases newest start first, optionally filtered on tenant name, property
/// title or owner name.
#[instrument(skip(db))]
pub async fn search_leases<C: ConnectionTrait>(
    db: &C,
    q: Option<&str>,
) -> Result<Vec<LeaseListing>, DbErr> {
    let mut query = lease_listing_query();
    if let Some(term) = search_term(q) {
        query = query.filter(
            Condition::any()
                .add(icontains(lease::Column::TenantName, &term))
                .add(icontains(property::Column::Title, &term))
                .add(icontains(owner::Column::FullName, &term)),
        );
    }
    query.into_model::<LeaseListing>().all(db).await
}

/// Lease requests received on an owner's properties.
#[instrument(skip(db))]
pub async fn owner_lease_requests<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Vec<LeaseListing>, DbErr> {
    lease_listing_query()
        .filter(property::Column::OwnerId.eq(owner_id))
        .into_model::<LeaseListing>()
        .all(db)
        .await
}

/// Counts per city, largest first, ties by label.
pub fn city_breakdown<I>(cities: I) -> Vec<CityCount>
where
    I: IntoIterator<Item = City>,
{
    let mut counts: HashMap<City, u64> = HashMap::new();
    for city in cities {
        *counts.entry(city).or_default() += 1;
    }
    let mut breakdown: Vec<CityCount> = counts
        .into_iter()
        .map(|(city, count)| CityCount {
            city,
            label: city.label().to_string(),
            count,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    breakdown
}

/// Portfolio summary for one owner.
#[instrument(skip(db))]
pub async fn owner_dashboard<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Option<OwnerDashboard>, DbErr> {
    let Some(owner) = owner::Entity::find_by_id(owner_id).one(db).await? else {
        return Ok(None);
    };

    let properties = property::Entity::find()
        .filter(property::Column::OwnerId.eq(owner_id))
        .order_by_desc(property::Column::CreatedAt)
        .order_by_asc(property::Column::Title)
        .all(db)
        .await?;
    let requests = owner_lease_requests(db, owner_id).await?;

    let total = properties.len() as u64;
    let available = properties.iter().filter(|p| p.disponible).count() as u64;

    Ok(Some(OwnerDashboard {
        owner: owner.into(),
        total_properties: total,
        available_properties: available,
        occupied_properties: total - available,
        lease_requests: requests.len() as u64,
        cities: city_breakdown(properties.iter().map(|p| p.city)),
        properties: properties.into_iter().map(PropertyView::from).collect(),
        requests,
    }))
}

/// Public listing summary plus the leases submitted under `tenant_email`.
#[instrument(skip(db))]
pub async fn tenant_dashboard<C: ConnectionTrait>(
    db: &C,
    tenant_email: Option<&str>,
) -> Result<TenantDashboard, DbErr> {
    let available = property::Entity::find().filter(property::Column::Disponible.eq(true));

    let recent_properties = available
        .clone()
        .order_by_desc(property::Column::CreatedAt)
        .order_by_asc(property::Column::Title)
        .limit(RECENT_PROPERTIES)
        .all(db)
        .await?;
    let available_count = available.clone().count(db).await?;

    let cities: Vec<City> = available
        .select_only()
        .column(property::Column::City)
        .into_tuple()
        .all(db)
        .await?;
    let mut top_cities = city_breakdown(cities);
    top_cities.truncate(TOP_CITIES);

    let leases = match search_term(tenant_email) {
        Some(email) => {
            lease_listing_query()
                .filter(
                    Expr::expr(Func::lower(Expr::col((
                        lease::Entity,
                        lease::Column::TenantEmail,
                    ))))
                    .eq(email),
                )
                .into_model::<LeaseListing>()
                .all(db)
                .await?
        }
        None => Vec::new(),
    };

    Ok(TenantDashboard {
        recent_properties: recent_properties.into_iter().map(PropertyView::from).collect(),
        available_properties: available_count,
        top_cities,
        leases,
    })
}
