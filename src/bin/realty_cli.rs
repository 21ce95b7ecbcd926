use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use realty_api::{
    auth::Actor,
    commands::owners::OwnerInput,
    config::{self, AppConfig},
    db::{self, DbPool},
    events::EventSender,
    queries::{LeaseListing, OwnerView, PropertyView},
    services::{LeaseService, OwnerService, PropertyService},
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Administrative commands for the realty database.
#[derive(Parser)]
#[command(name = "realty-cli", version, about)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Owners(OwnersCommands),
    #[command(subcommand)]
    Properties(PropertiesCommands),
    #[command(subcommand)]
    Leases(LeasesCommands),
    /// Re-derive every property's availability from its leases
    Reconcile,
    /// Apply pending database migrations
    Migrate,
}

#[derive(Subcommand)]
enum OwnersCommands {
    /// List owners, optionally filtered
    List(SearchArgs),
    /// Create an owner
    Create(CreateOwnerArgs),
}

#[derive(Subcommand)]
enum PropertiesCommands {
    /// List properties, optionally filtered on title or city
    List(SearchArgs),
}

#[derive(Subcommand)]
enum LeasesCommands {
    /// List leases, optionally filtered on tenant, property or owner
    List(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Case-insensitive search term
    #[arg(long, short)]
    query: Option<String>,
}

#[derive(Args)]
struct CreateOwnerArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Identity to link to the owner
    #[arg(long)]
    user_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Owners(command) => handle_owners_command(&context, command, cli.json).await?,
        Commands::Properties(PropertiesCommands::List(args)) => {
            let properties = context
                .property_service()
                .search_properties(args.query.as_deref())
                .await
                .context("failed to list properties")?;
            let views: Vec<PropertyView> =
                properties.into_iter().map(PropertyView::from).collect();
            if cli.json {
                print_json(&views)?;
            } else {
                views.iter().for_each(render_property);
            }
        }
        Commands::Leases(LeasesCommands::List(args)) => {
            let leases = context
                .lease_service()
                .search_leases(args.query.as_deref())
                .await
                .context("failed to list leases")?;
            if cli.json {
                print_json(&leases)?;
            } else {
                leases.iter().for_each(render_lease);
            }
        }
        Commands::Reconcile => {
            let changes = context
                .property_service()
                .reconcile_all(context.actor())
                .await
                .context("failed to reconcile availability")?;
            if cli.json {
                print_json(&changes)?;
            } else if changes.is_empty() {
                println!("All properties already consistent");
            } else {
                for change in &changes {
                    println!("- Property {} is now {}", change.property_id, change.availability);
                }
            }
        }
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
    }

    Ok(())
}

async fn handle_owners_command(
    context: &CliContext,
    command: OwnersCommands,
    json: bool,
) -> Result<()> {
    let service = context.owner_service();
    match command {
        OwnersCommands::List(args) => {
            let owners: Vec<OwnerView> = service
                .search_owners(args.query.as_deref())
                .await
                .context("failed to list owners")?
                .into_iter()
                .map(OwnerView::from)
                .collect();
            if json {
                print_json(&owners)?;
            } else {
                owners.iter().for_each(render_owner);
            }
        }
        OwnersCommands::Create(args) => {
            let input = OwnerInput {
                full_name: args.name,
                email: args.email,
                telephone: args.phone,
                user_id: args.user_id,
            };
            let owner = OwnerView::from(
                service
                    .create_owner(context.actor(), input)
                    .await
                    .context("failed to create owner")?,
            );
            if json {
                print_json(&owner)?;
            } else {
                println!("Created owner {}", owner.id);
                render_owner(&owner);
            }
        }
    }
    Ok(())
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(&config.log_level, config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        let (event_sender, mut event_rx) = EventSender::channel(config.event_channel_capacity);

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(target: "realty_cli", event = ?event, "received async event");
            }
        });

        Ok(Self {
            _config: config,
            db,
            event_sender: Arc::new(event_sender),
        })
    }

    /// The CLI operates with staff rights.
    fn actor(&self) -> Actor {
        Actor::staff(Uuid::nil())
    }

    fn owner_service(&self) -> OwnerService {
        OwnerService::new(self.db.clone(), self.event_sender.clone())
    }

    fn property_service(&self) -> PropertyService {
        PropertyService::new(self.db.clone(), self.event_sender.clone())
    }

    fn lease_service(&self) -> LeaseService {
        LeaseService::new(self.db.clone(), self.event_sender.clone())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_owner(owner: &OwnerView) {
    println!(
        "- Owner {} • {} • {} • {}",
        owner.id,
        owner.full_name,
        owner.email.as_deref().unwrap_or("-"),
        owner.telephone.as_deref().unwrap_or("-"),
    );
}

fn render_property(property: &PropertyView) {
    println!(
        "- Property {} • {} • {} • {} m² • {} / month • {}",
        property.id,
        property.title,
        property.city_label,
        property.surface_area_m2,
        property.monthly_rent,
        property.availability(),
    );
}

fn render_lease(lease: &LeaseListing) {
    println!(
        "- Lease {} • {} on '{}' ({}) • {} → {} • {}",
        lease.id,
        lease.tenant_name,
        lease.property_title,
        lease.owner_name,
        lease.start_date,
        lease.end_date,
        if lease.active { "active" } else { "inactive" },
    );
}
