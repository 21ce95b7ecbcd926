#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use realty_api::{
    auth::{Actor, ACTOR_ID_HEADER, ACTOR_STAFF_HEADER},
    commands::{leases::LeaseInput, owners::OwnerInput, properties::PropertyInput},
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{lease, owner, property, City, PropertyType},
    events::{Event, EventSender},
    handlers::AppServices,
    AppState,
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Services over a fresh in-memory SQLite database with migrations applied.
///
/// Events are kept on the receiver so tests can inspect what was published.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub events: mpsc::Receiver<Event>,
    pub event_sender: Arc<EventSender>,
    pub staff: Actor,
}

impl TestContext {
    pub async fn new() -> Self {
        // One connection: every handle sees the same in-memory database.
        Self::with_db_config(DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
    }

    /// A database file under `dir` shared by `connections` pooled
    /// connections, so concurrent transactions really overlap.
    pub async fn file_backed(dir: &Path, connections: u32) -> Self {
        Self::with_db_config(DbConfig {
            url: format!("sqlite://{}?mode=rwc", dir.join("realty.db").display()),
            max_connections: connections,
            min_connections: 1,
            ..Default::default()
        })
        .await
    }

    async fn with_db_config(config: DbConfig) -> Self {
        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let (sender, events) = EventSender::channel(1024);
        let event_sender = Arc::new(sender);
        let services = AppServices::new(db.clone(), event_sender.clone());

        Self {
            db,
            services,
            events,
            event_sender,
            staff: Actor::staff(Uuid::new_v4()),
        }
    }

    /// Drains every event published so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub async fn create_owner(&self, name: &str, email: Option<&str>) -> owner::Model {
        self.services
            .owners
            .create_owner(self.staff, owner_input(name, email))
            .await
            .expect("create owner")
    }

    /// Owner linked to a fresh identity, returned with that identity's actor.
    pub async fn create_linked_owner(&self, name: &str) -> (owner::Model, Actor) {
        let user_id = Uuid::new_v4();
        let mut input = owner_input(name, None);
        input.user_id = Some(user_id);
        let owner = self
            .services
            .owners
            .create_owner(self.staff, input)
            .await
            .expect("create linked owner");
        (owner, Actor::user(user_id))
    }

    pub async fn create_property(&self, owner: &owner::Model, title: &str) -> property::Model {
        self.services
            .properties
            .create_property(self.staff, property_input(owner.id, title, City::Douala))
            .await
            .expect("create property")
    }

    pub async fn submit(&self, input: LeaseInput) -> lease::Model {
        self.services
            .leases
            .submit_lease(self.staff, input)
            .await
            .expect("submit lease")
    }

    pub async fn reload_property(&self, id: Uuid) -> property::Model {
        property::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .expect("query property")
            .expect("property exists")
    }

    pub async fn lease_count(&self) -> usize {
        lease::Entity::find()
            .all(&*self.db)
            .await
            .expect("query leases")
            .len()
    }
}

pub fn owner_input(name: &str, email: Option<&str>) -> OwnerInput {
    OwnerInput {
        full_name: name.to_string(),
        email: email.map(str::to_string),
        telephone: None,
        user_id: None,
    }
}

pub fn property_input(owner_id: Uuid, title: &str, city: City) -> PropertyInput {
    PropertyInput {
        title: title.to_string(),
        address: "12 Rue de la Joie".to_string(),
        city,
        surface_area_m2: 80,
        monthly_rent: dec!(150000.00),
        property_type: PropertyType::Apartment,
        owner_id: Some(owner_id),
        exige_validation_contrat: false,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn lease_input(property: &property::Model, tenant: &str) -> LeaseInput {
    LeaseInput {
        owner_id: property.owner_id,
        property_id: property.id,
        tenant_name: tenant.to_string(),
        tenant_phone: None,
        tenant_email: None,
        tenant_notes: None,
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        deposit: dec!(300000.00),
        active: true,
        accept_contract: false,
    }
}

/// HTTP harness driving the full router with `oneshot`.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub ctx_events: mpsc::Receiver<Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        let ctx = TestContext::new().await;
        let mut cfg = AppConfig::new("sqlite::memory:".to_string());
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let state = AppState::new(ctx.db.clone(), cfg, ctx.event_sender.clone());
        let router = realty_api::build_router(state.clone());
        Self {
            router,
            state,
            ctx_events: ctx.events,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        actor: Option<Actor>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            if let Some(id) = actor.user_id {
                builder = builder.header(ACTOR_ID_HEADER, id.to_string());
            }
            if actor.is_staff {
                builder = builder.header(ACTOR_STAFF_HEADER, "true");
            }
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
