use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::FieldErrors;
use crate::entities::{lease, owner, property};

pub const END_BEFORE_START: &str = "End date must be after the start date.";
pub const OWNER_MISMATCH: &str = "The selected property does not belong to the selected owner.";
pub const ALREADY_ACTIVE: &str = "This property already has an active lease.";
pub const CONTRACT_NOT_ACCEPTED: &str =
    "You must accept the owner's contract to rent this property.";

/// The parts of a lease submission that the cross-entity rules look at.
#[derive(Debug, Clone)]
pub struct LeaseCandidate {
    /// Set when an existing lease is being edited.
    pub id: Option<Uuid>,
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
    pub accept_contract: bool,
}

/// Applies every lease rule and collects all failures.
///
/// `other_active_lease` tells whether the property already carries an active
/// lease other than the candidate itself.
pub fn check_lease_rules(
    candidate: &LeaseCandidate,
    property: &property::Model,
    asserted_owner: &owner::Model,
    other_active_lease: bool,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if candidate.end_date <= candidate.start_date {
        errors.add("end_date", END_BEFORE_START);
    }

    if property.owner_id != asserted_owner.id {
        errors.add("property_id", OWNER_MISMATCH);
    }

    if candidate.active && other_active_lease {
        errors.add("active", ALREADY_ACTIVE);
    }

    if property.exige_validation_contrat && !candidate.accept_contract {
        errors.add("accept_contract", CONTRACT_NOT_ACCEPTED);
    }

    errors
}

/// Whether `property_id` has an active lease other than `exclude`.
pub async fn has_other_active_lease<C: ConnectionTrait>(
    db: &C,
    property_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<bool, DbErr> {
    let mut query = lease::Entity::find()
        .filter(lease::Column::PropertyId.eq(property_id))
        .filter(lease::Column::Active.eq(true));
    if let Some(id) = exclude {
        query = query.filter(lease::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Reads the active-lease state through `db` and runs [`check_lease_rules`].
///
/// Pass the write transaction as `db` so the read and the write see the same
/// snapshot.
pub async fn validate_lease<C: ConnectionTrait>(
    db: &C,
    candidate: &LeaseCandidate,
    property: &property::Model,
    asserted_owner: &owner::Model,
) -> Result<FieldErrors, DbErr> {
    let other_active = if candidate.active {
        has_other_active_lease(db, property.id, candidate.id).await?
    } else {
        false
    };

    Ok(check_lease_rules(
        candidate,
        property,
        asserted_owner,
        other_active,
    ))
}

/// Properties a lease submission may point at.
///
/// With an owner context (explicit, or the owner of the edited lease's
/// property) this is the owner's available properties plus the edited lease's
/// current property, by title. Without owner context and without an edited
/// lease the set is empty. An edit whose narrowed set is empty falls back to
/// every available property plus the current one.
pub async fn selectable_properties<C: ConnectionTrait>(
    db: &C,
    owner_id: Option<Uuid>,
    editing: Option<&lease::Model>,
) -> Result<Vec<property::Model>, DbErr> {
    let current_property_id = editing.map(|lease| lease.property_id);

    let owner_id = match (owner_id, current_property_id) {
        (Some(owner_id), _) => Some(owner_id),
        (None, Some(property_id)) => property::Entity::find_by_id(property_id)
            .one(db)
            .await?
            .map(|p| p.owner_id),
        (None, None) => None,
    };

    let mut selectable = Vec::new();
    if let Some(owner_id) = owner_id {
        let mut condition = Condition::any().add(
            Condition::all()
                .add(property::Column::OwnerId.eq(owner_id))
                .add(property::Column::Disponible.eq(true)),
        );
        if let Some(property_id) = current_property_id {
            condition = condition.add(property::Column::Id.eq(property_id));
        }
        selectable = property::Entity::find()
            .filter(condition)
            .order_by_asc(property::Column::Title)
            .all(db)
            .await?;
    }

    if let (Some(property_id), true) = (current_property_id, selectable.is_empty()) {
        selectable = property::Entity::find()
            .filter(
                Condition::any()
                    .add(property::Column::Disponible.eq(true))
                    .add(property::Column::Id.eq(property_id)),
            )
            .order_by_asc(property::Column::Title)
            .all(db)
            .await?;
    }

    Ok(selectable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{City, PropertyType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn owner(id: Uuid) -> owner::Model {
        owner::Model {
            id,
            user_id: None,
            full_name: "Jane".into(),
            email: Some("jane@example.com".into()),
            telephone: None,
            created_at: Utc::now(),
        }
    }

    fn property(owner_id: Uuid, requires_acceptance: bool) -> property::Model {
        property::Model {
            id: Uuid::new_v4(),
            owner_id,
            title: "P1".into(),
            address: "Rue 1".into(),
            city: City::Douala,
            surface_area_m2: 80,
            monthly_rent: dec!(50000),
            property_type: PropertyType::Apartment,
            disponible: true,
            exige_validation_contrat: requires_acceptance,
            created_at: Utc::now(),
        }
    }

    fn candidate(property_id: Uuid) -> LeaseCandidate {
        LeaseCandidate {
            id: None,
            property_id,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            active: true,
            accept_contract: false,
        }
    }

    #[test]
    fn valid_candidate_has_no_errors() {
        let jane = owner(Uuid::new_v4());
        let p1 = property(jane.id, false);
        assert!(check_lease_rules(&candidate(p1.id), &p1, &jane, false).is_empty());
    }

    #[test]
    fn all_failures_are_collected() {
        let jane = owner(Uuid::new_v4());
        let someone_else = owner(Uuid::new_v4());
        let p1 = property(jane.id, true);
        let mut c = candidate(p1.id);
        c.end_date = c.start_date;

        let errors = check_lease_rules(&c, &p1, &someone_else, true);
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["accept_contract", "active", "end_date", "property_id"]
        );
    }

    #[test]
    fn inactive_candidate_ignores_existing_active_lease() {
        let jane = owner(Uuid::new_v4());
        let p1 = property(jane.id, false);
        let mut c = candidate(p1.id);
        c.active = false;
        assert!(check_lease_rules(&c, &p1, &jane, true).is_empty());
    }

    #[test]
    fn acceptance_flag_satisfies_contract_requirement() {
        let jane = owner(Uuid::new_v4());
        let p1 = property(jane.id, true);
        let mut c = candidate(p1.id);
        assert!(check_lease_rules(&c, &p1, &jane, false).contains("accept_contract"));
        c.accept_contract = true;
        assert!(check_lease_rules(&c, &p1, &jane, false).is_empty());
    }
}
