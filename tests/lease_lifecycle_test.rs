mod common;

use assert_matches::assert_matches;
use common::{date, lease_input, TestContext};
use realty_api::{
    errors::ServiceError,
    events::Event,
    validation::lease::{ALREADY_ACTIVE, CONTRACT_NOT_ACCEPTED, END_BEFORE_START, OWNER_MISMATCH},
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

fn lease_created_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::LeaseCreated(_)))
        .count()
}

#[tokio::test]
async fn second_active_lease_is_rejected_and_first_survives() {
    let mut ctx = TestContext::new().await;
    let jane = ctx.create_owner("Jane", Some("jane@example.com")).await;
    let mut input = common::property_input(jane.id, "P1", realty_api::entities::City::Douala);
    input.monthly_rent = dec!(50000);
    let p1 = ctx
        .services
        .properties
        .create_property(ctx.staff, input)
        .await
        .unwrap();
    assert!(p1.disponible);

    let mut tom = lease_input(&p1, "Tom");
    tom.start_date = date(2026, 3, 1);
    tom.end_date = date(2026, 4, 1);
    tom.deposit = dec!(10000);
    let l1 = ctx.submit(tom.clone()).await;
    assert!(l1.active);
    assert!(!ctx.reload_property(p1.id).await.disponible);

    let mut amy = tom;
    amy.tenant_name = "Amy".to_string();
    let err = ctx
        .services
        .leases
        .submit_lease(ctx.staff, amy)
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(errors) => {
        assert_eq!(errors.get("active"), Some(&[ALREADY_ACTIVE.to_string()][..]));
    });

    let leases = ctx
        .services
        .owners
        .lease_requests(jane.id)
        .await
        .unwrap();
    assert_eq!(leases.len(), 1);
    assert_eq!(leases[0].id, l1.id);
    assert!(leases[0].active);
    assert!(!ctx.reload_property(p1.id).await.disponible);

    let events = ctx.drain_events();
    assert_eq!(lease_created_count(&events), 1);
}

#[tokio::test]
async fn inactive_leases_do_not_occupy_a_property() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Paul", None).await;
    let property = ctx.create_property(&owner, "Studio").await;

    let mut first = lease_input(&property, "Tom");
    first.active = false;
    ctx.submit(first.clone()).await;
    let mut second = first;
    second.tenant_name = "Amy".to_string();
    ctx.submit(second).await;

    assert!(ctx.reload_property(property.id).await.disponible);
    assert_eq!(ctx.lease_count().await, 2);

    // One active lease next to inactive ones is accepted.
    ctx.submit(lease_input(&property, "Zoe")).await;
    assert!(!ctx.reload_property(property.id).await.disponible);
}

#[tokio::test]
async fn end_date_must_follow_start_date() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;

    for end in [date(2024, 1, 1), date(2023, 12, 31)] {
        let mut input = lease_input(&property, "Tom");
        input.end_date = end;
        let err = ctx
            .services
            .leases
            .submit_lease(ctx.staff, input)
            .await
            .unwrap_err();
        assert_matches!(&err, ServiceError::ValidationError(errors) => {
            assert_eq!(errors.get("end_date"), Some(&[END_BEFORE_START.to_string()][..]));
            assert!(!errors.contains("active"));
        });
    }

    assert_eq!(ctx.lease_count().await, 0);
    assert!(ctx.reload_property(property.id).await.disponible);
}

#[tokio::test]
async fn every_rule_failure_is_reported_together() {
    let ctx = TestContext::new().await;
    let jane = ctx.create_owner("Jane", None).await;
    let paul = ctx.create_owner("Paul", None).await;
    let mut input = common::property_input(jane.id, "Villa", realty_api::entities::City::Kribi);
    input.exige_validation_contrat = true;
    let villa = ctx
        .services
        .properties
        .create_property(ctx.staff, input)
        .await
        .unwrap();

    let mut lease = lease_input(&villa, "Tom");
    lease.owner_id = paul.id;
    lease.end_date = lease.start_date;
    lease.tenant_email = Some("not-an-email".to_string());

    let err = ctx
        .services
        .leases
        .submit_lease(ctx.staff, lease)
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(errors) => {
        assert_eq!(errors.get("property_id"), Some(&[OWNER_MISMATCH.to_string()][..]));
        assert_eq!(errors.get("end_date"), Some(&[END_BEFORE_START.to_string()][..]));
        assert_eq!(
            errors.get("accept_contract"),
            Some(&[CONTRACT_NOT_ACCEPTED.to_string()][..])
        );
        assert!(errors.contains("tenant_email"));
    });
    assert_eq!(ctx.lease_count().await, 0);
}

#[tokio::test]
async fn contract_acceptance_is_required_when_the_property_demands_it() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let mut input = common::property_input(owner.id, "Duplex", realty_api::entities::City::Buea);
    input.exige_validation_contrat = true;
    let property = ctx
        .services
        .properties
        .create_property(ctx.staff, input)
        .await
        .unwrap();

    let lease = lease_input(&property, "Tom");
    let err = ctx
        .services
        .leases
        .submit_lease(ctx.staff, lease.clone())
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(errors) => {
        assert!(errors.contains("accept_contract"));
    });

    let mut accepted = lease;
    accepted.accept_contract = true;
    let saved = ctx.submit(accepted).await;
    assert_eq!(saved.tenant_name, "Tom");
    assert_eq!(ctx.lease_count().await, 1);
}

#[tokio::test]
async fn deleting_the_active_lease_frees_the_property() {
    let mut ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", Some("jane@example.com")).await;
    let property = ctx.create_property(&owner, "P1").await;
    let lease = ctx.submit(lease_input(&property, "Tom")).await;
    assert!(!ctx.reload_property(property.id).await.disponible);
    ctx.drain_events();

    ctx.services
        .leases
        .delete_lease(ctx.staff, lease.id)
        .await
        .unwrap();
    assert!(ctx.reload_property(property.id).await.disponible);

    let events = ctx.drain_events();
    assert_eq!(lease_created_count(&events), 0);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::AvailabilityChanged { property_id, disponible: true } if *property_id == property.id
    )));

    let missing = ctx
        .services
        .leases
        .delete_lease(ctx.staff, lease.id)
        .await
        .unwrap_err();
    assert_matches!(missing, ServiceError::NotFound(_));
}

#[tokio::test]
async fn reassigning_a_lease_moves_occupancy() {
    let mut ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let a = ctx.create_property(&owner, "A").await;
    let b = ctx.create_property(&owner, "B").await;
    let lease = ctx.submit(lease_input(&a, "Tom")).await;
    ctx.drain_events();

    let mut moved = lease_input(&b, "Tom");
    moved.deposit = dec!(120000.50);
    let updated = ctx
        .services
        .leases
        .update_lease(ctx.staff, lease.id, moved)
        .await
        .unwrap();
    assert_eq!(updated.property_id, b.id);
    assert_eq!(updated.deposit, dec!(120000.50));

    assert!(ctx.reload_property(a.id).await.disponible);
    assert!(!ctx.reload_property(b.id).await.disponible);

    let events = ctx.drain_events();
    assert_eq!(lease_created_count(&events), 0);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::LeaseUpdated(id) if *id == lease.id)));
}

#[tokio::test]
async fn editing_a_lease_does_not_conflict_with_itself() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;
    let lease = ctx.submit(lease_input(&property, "Tom")).await;

    let mut edit = lease_input(&property, "Tom Junior");
    edit.end_date = date(2025, 6, 30);
    let updated = ctx
        .services
        .leases
        .update_lease(ctx.staff, lease.id, edit)
        .await
        .unwrap();
    assert_eq!(updated.tenant_name, "Tom Junior");
    assert!(updated.active);

    // Deactivating through an edit frees the property.
    let mut deactivate = lease_input(&property, "Tom Junior");
    deactivate.active = false;
    ctx.services
        .leases
        .update_lease(ctx.staff, lease.id, deactivate)
        .await
        .unwrap();
    assert!(ctx.reload_property(property.id).await.disponible);
}

#[tokio::test]
async fn moving_onto_an_occupied_property_is_rejected() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let a = ctx.create_property(&owner, "A").await;
    let b = ctx.create_property(&owner, "B").await;
    let on_a = ctx.submit(lease_input(&a, "Tom")).await;
    ctx.submit(lease_input(&b, "Amy")).await;

    let err = ctx
        .services
        .leases
        .update_lease(ctx.staff, on_a.id, lease_input(&b, "Tom"))
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(errors) => {
        assert!(errors.contains("active"));
    });

    let reloaded = ctx.services.leases.get_lease(on_a.id).await.unwrap();
    assert_eq!(reloaded.property_id, a.id);
    assert!(!ctx.reload_property(a.id).await.disponible);
    assert!(!ctx.reload_property(b.id).await.disponible);
}

#[tokio::test]
async fn notification_is_published_once_per_created_lease() {
    let mut ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", Some("jane@example.com")).await;
    let property = ctx.create_property(&owner, "Villa Bastos").await;
    ctx.drain_events();

    let mut input = lease_input(&property, "Tom");
    input.tenant_email = Some("tom@example.com".to_string());
    let lease = ctx.submit(input.clone()).await;

    // Rejected duplicate, then edit and delete: none of these notify.
    let _ = ctx
        .services
        .leases
        .submit_lease(ctx.staff, input.clone())
        .await
        .unwrap_err();
    input.tenant_notes = Some("Updated".to_string());
    ctx.services
        .leases
        .update_lease(ctx.staff, lease.id, input)
        .await
        .unwrap();
    ctx.services
        .leases
        .delete_lease(ctx.staff, lease.id)
        .await
        .unwrap();

    let events = ctx.drain_events();
    let notices: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::LeaseCreated(notice) => Some(notice),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    let notice = notices[0];
    assert_eq!(notice.lease_id, lease.id);
    assert_eq!(notice.property_title, "Villa Bastos");
    assert_eq!(notice.owner_email.as_deref(), Some("jane@example.com"));
    assert_eq!(notice.tenant_email.as_deref(), Some("tom@example.com"));
}

#[tokio::test]
async fn lease_creation_survives_a_closed_event_channel() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", Some("jane@example.com")).await;
    let property = ctx.create_property(&owner, "P1").await;

    let TestContext {
        services, events, staff, ..
    } = ctx;
    drop(events);

    let lease = services
        .leases
        .submit_lease(staff, lease_input(&property, "Tom"))
        .await
        .unwrap();
    assert!(lease.active);
}

/// Submits eight active leases on one property at once; exactly one wins and
/// every other submission is refused on `active`.
async fn race_active_submissions(ctx: &TestContext) {
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let service = ctx.services.leases.clone();
        let staff = ctx.staff;
        let input = lease_input(&property, &format!("Tenant {i}"));
        tasks.push(tokio::spawn(async move {
            service.submit_lease(staff, input).await
        }));
    }

    let mut admitted = 0;
    let mut refused = 0;
    for task in tasks {
        match task.await.expect("task") {
            Ok(_) => admitted += 1,
            Err(err) => assert_matches!(err, ServiceError::ValidationError(errors) => {
                assert!(errors.contains("active"));
                refused += 1;
            }),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(refused, 7);
    assert_eq!(ctx.lease_count().await, 1);
    assert!(!ctx.reload_property(property.id).await.disponible);
}

#[tokio::test]
async fn concurrent_active_submissions_admit_exactly_one() {
    let ctx = TestContext::new().await;
    race_active_submissions(&ctx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_over_pooled_connections_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = TestContext::file_backed(dir.path(), 8).await;
    race_active_submissions(&ctx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reconcile_sweep_never_overwrites_concurrent_leases() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = TestContext::file_backed(dir.path(), 4).await;
    let owner = ctx.create_owner("Jane", None).await;
    let mut properties = Vec::new();
    for i in 0..6 {
        properties.push(ctx.create_property(&owner, &format!("P{i}")).await);
    }

    let mut sweeps = Vec::new();
    for _ in 0..3 {
        let service = ctx.services.properties.clone();
        let staff = ctx.staff;
        sweeps.push(tokio::spawn(async move { service.reconcile_all(staff).await }));
    }
    let mut submissions = Vec::new();
    for property in &properties {
        let service = ctx.services.leases.clone();
        let staff = ctx.staff;
        let input = lease_input(property, "Tom");
        submissions.push(tokio::spawn(async move {
            service.submit_lease(staff, input).await
        }));
    }

    for sweep in sweeps {
        sweep.await.expect("task").unwrap();
    }
    for submission in submissions {
        submission.await.expect("task").unwrap();
    }

    for property in &properties {
        assert!(!ctx.reload_property(property.id).await.disponible);
    }
}

#[tokio::test]
async fn one_active_lease_index_backs_up_the_check() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;
    ctx.submit(lease_input(&property, "Tom")).await;
    let mut inactive = lease_input(&property, "Amy");
    inactive.active = false;
    let amy = ctx.submit(inactive).await;

    // Bypassing the service, the database still refuses a second active lease.
    let mut raw = amy.into_active_model();
    raw.active = Set(true);
    assert!(raw.update(&*ctx.db).await.is_err());
}

#[tokio::test]
async fn missing_references_are_not_found() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;

    let mut input = lease_input(&property, "Tom");
    input.property_id = uuid::Uuid::new_v4();
    let err = ctx
        .services
        .leases
        .submit_lease(ctx.staff, input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let mut input = lease_input(&property, "Tom");
    input.owner_id = uuid::Uuid::new_v4();
    let err = ctx
        .services
        .leases
        .submit_lease(ctx.staff, input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn anonymous_submissions_are_unauthorized() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_owner("Jane", None).await;
    let property = ctx.create_property(&owner, "P1").await;

    let err = ctx
        .services
        .leases
        .submit_lease(realty_api::auth::Actor::anonymous(), lease_input(&property, "Tom"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Unauthorized(_));
    assert_eq!(ctx.lease_count().await, 0);
}

#[tokio::test]
async fn only_staff_or_the_owner_may_edit_a_lease() {
    let ctx = TestContext::new().await;
    let (owner, owner_actor) = ctx.create_linked_owner("Jane").await;
    let property = ctx.create_property(&owner, "P1").await;
    let (_, stranger) = ctx.create_linked_owner("Paul").await;

    // Any authenticated actor may submit.
    let lease = ctx
        .services
        .leases
        .submit_lease(stranger, lease_input(&property, "Tom"))
        .await
        .unwrap();

    let err = ctx
        .services
        .leases
        .delete_lease(stranger, lease.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let mut edit = lease_input(&property, "Tom");
    edit.tenant_phone = Some("+237 650 00 00 00".to_string());
    let updated = ctx
        .services
        .leases
        .update_lease(owner_actor, lease.id, edit)
        .await
        .unwrap();
    assert_eq!(updated.tenant_phone.as_deref(), Some("+237 650 00 00 00"));
}
