//! Seed data script - populates the database with demo owners, properties and leases
//!
//! Run with: cargo run --bin seed-data
//!
//! Everything goes through the regular services, so lease rules and property
//! availability hold for the seeded data as well.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use realty_api::{
    auth::Actor,
    commands::{leases::LeaseInput, owners::OwnerInput, properties::PropertyInput},
    config, db,
    entities::{City, OwnerModel, PropertyModel, PropertyType},
    events::EventSender,
    services::{LeaseService, OwnerService, PropertyService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    info!("=== Realty API Seed Data ===");

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;
    let pool = Arc::new(pool);

    // Seeding does not notify anyone; events are drained and dropped.
    let (sender, mut rx) = EventSender::channel(cfg.event_channel_capacity);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    let sender = Arc::new(sender);

    let owners = OwnerService::new(pool.clone(), sender.clone());
    let properties = PropertyService::new(pool.clone(), sender.clone());
    let leases = LeaseService::new(pool, sender);
    let staff = Actor::staff(Uuid::nil());

    info!("Creating owners...");
    let mut created_owners = Vec::new();
    for (name, email, phone) in [
        ("Jane Mbarga", Some("jane.mbarga@example.com"), Some("+237 650 00 00 01")),
        ("Paul Nkeng", Some("paul.nkeng@example.com"), None),
        ("Awa Bello", None, Some("+237 670 00 00 03")),
    ] {
        let owner = owners
            .create_owner(
                staff,
                OwnerInput {
                    full_name: name.to_string(),
                    email: email.map(str::to_string),
                    telephone: phone.map(str::to_string),
                    user_id: None,
                },
            )
            .await?;
        created_owners.push(owner);
    }
    info!("  Created {} owners", created_owners.len());

    info!("Creating properties...");
    let created_properties = create_properties(&properties, staff, &created_owners).await?;
    info!("  Created {} properties", created_properties.len());

    info!("Creating leases...");
    let today = Utc::now().date_naive();
    let mut lease_count = 0;
    for (index, property) in created_properties.iter().enumerate().step_by(2) {
        let start = today - Duration::days(30 * index as i64);
        leases
            .submit_lease(
                staff,
                LeaseInput {
                    owner_id: property.owner_id,
                    property_id: property.id,
                    tenant_name: format!("Tenant {}", index + 1),
                    tenant_phone: None,
                    tenant_email: Some(format!("tenant{}@example.com", index + 1)),
                    tenant_notes: None,
                    start_date: start,
                    end_date: one_year_after(start),
                    deposit: property.monthly_rent * dec!(2),
                    active: true,
                    accept_contract: property.exige_validation_contrat,
                },
            )
            .await?;
        lease_count += 1;
    }
    info!("  Created {} leases", lease_count);

    info!("=== Seed Data Complete ===");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/properties");
    info!("  curl http://localhost:8080/api/v1/leases");
    info!("  curl 'http://localhost:8080/api/v1/tenant/dashboard?email=tenant1@example.com'");

    Ok(())
}

async fn create_properties(
    service: &PropertyService,
    staff: Actor,
    owners: &[OwnerModel],
) -> anyhow::Result<Vec<PropertyModel>> {
    let listings: [(&str, &str, City, i32, Decimal, PropertyType, bool); 6] = [
        ("Villa Bastos", "Rue 1.234, Bastos", City::Yaounde, 320, dec!(850000), PropertyType::House, true),
        ("Studio Akwa", "Boulevard de la Liberté", City::Douala, 35, dec!(120000), PropertyType::Apartment, false),
        ("Terrain Kribi Plage", "Route de Londji", City::Kribi, 900, dec!(60000), PropertyType::Land, false),
        ("Duplex Bonapriso", "Rue Njo-Njo", City::Douala, 180, dec!(450000), PropertyType::House, true),
        ("Boutique Marché A", "Marché A", City::Bafoussam, 40, dec!(90000), PropertyType::Commercial, false),
        ("Appartement Molyko", "Molyko", City::Buea, 75, dec!(150000), PropertyType::Apartment, false),
    ];

    let mut created = Vec::with_capacity(listings.len());
    for (index, (title, address, city, surface, rent, kind, contract)) in
        listings.into_iter().enumerate()
    {
        let owner = &owners[index % owners.len()];
        let property = service
            .create_property(
                staff,
                PropertyInput {
                    title: title.to_string(),
                    address: address.to_string(),
                    city,
                    surface_area_m2: surface,
                    monthly_rent: rent,
                    property_type: kind,
                    owner_id: Some(owner.id),
                    exige_validation_contrat: contract,
                },
            )
            .await?;
        created.push(property);
    }
    Ok(created)
}

fn one_year_after(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_signed(Duration::days(365))
        .unwrap_or(start + Duration::days(1))
}
