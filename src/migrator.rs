use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_owners_table::Migration),
            Box::new(m20240301_000002_create_properties_table::Migration),
            Box::new(m20240301_000003_create_leases_table::Migration),
            Box::new(m20240301_000004_one_active_lease_per_property::Migration),
        ]
    }
}

mod m20240301_000001_create_owners_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_owners_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Owners::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Owners::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Owners::UserId).uuid().null())
                        .col(ColumnDef::new(Owners::FullName).string_len(120).not_null())
                        .col(ColumnDef::new(Owners::Email).string_len(254).null())
                        .col(ColumnDef::new(Owners::Telephone).string_len(20).null())
                        .col(
                            ColumnDef::new(Owners::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // At most one owner per authenticated identity; NULLs are distinct.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_owners_user_id")
                        .table(Owners::Table)
                        .col(Owners::UserId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_owners_full_name")
                        .table(Owners::Table)
                        .col(Owners::FullName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Owners::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Owners {
        Table,
        Id,
        UserId,
        FullName,
        Email,
        Telephone,
        CreatedAt,
    }
}

mod m20240301_000002_create_properties_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_properties_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Properties::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Properties::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Properties::OwnerId).uuid().not_null())
                        .col(ColumnDef::new(Properties::Title).string_len(150).not_null())
                        .col(
                            ColumnDef::new(Properties::Address)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Properties::City).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Properties::SurfaceAreaM2)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Properties::MonthlyRent)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Properties::PropertyType)
                                .string_len(30)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Properties::Disponible)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Properties::ExigeValidationContrat)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Properties::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_properties_owner_id")
                                .from(Properties::Table, Properties::OwnerId)
                                .to(Owners::Table, Owners::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_properties_owner_id")
                        .table(Properties::Table)
                        .col(Properties::OwnerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_properties_created_at")
                        .table(Properties::Table)
                        .col(Properties::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Properties::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Properties {
        Table,
        Id,
        OwnerId,
        Title,
        Address,
        City,
        SurfaceAreaM2,
        MonthlyRent,
        PropertyType,
        Disponible,
        ExigeValidationContrat,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Owners {
        Table,
        Id,
    }
}

mod m20240301_000003_create_leases_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_leases_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Leases::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Leases::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Leases::PropertyId).uuid().not_null())
                        .col(ColumnDef::new(Leases::TenantName).string_len(120).not_null())
                        .col(ColumnDef::new(Leases::TenantPhone).string_len(20).null())
                        .col(ColumnDef::new(Leases::TenantEmail).string_len(254).null())
                        .col(ColumnDef::new(Leases::TenantNotes).text().null())
                        .col(ColumnDef::new(Leases::StartDate).date().not_null())
                        .col(ColumnDef::new(Leases::EndDate).date().not_null())
                        .col(ColumnDef::new(Leases::Deposit).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Leases::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_leases_property_id")
                                .from(Leases::Table, Leases::PropertyId)
                                .to(Properties::Table, Properties::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_leases_property_id")
                        .table(Leases::Table)
                        .col(Leases::PropertyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_leases_start_date")
                        .table(Leases::Table)
                        .col(Leases::StartDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Leases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Leases {
        Table,
        Id,
        PropertyId,
        TenantName,
        TenantPhone,
        TenantEmail,
        TenantNotes,
        StartDate,
        EndDate,
        Deposit,
        Active,
    }

    #[derive(DeriveIden)]
    enum Properties {
        Table,
        Id,
    }
}

mod m20240301_000004_one_active_lease_per_property {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_one_active_lease_per_property"
        }
    }

    const INDEX_NAME: &str = "idx_leases_one_active_per_property";

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Partial indexes are not expressible through the index builder.
            // PostgreSQL and SQLite share this syntax.
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS {INDEX_NAME} ON leases (property_id) WHERE active"
                ))
                .await?;
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .get_connection()
                .execute_unprepared(&format!("DROP INDEX IF EXISTS {INDEX_NAME}"))
                .await?;
            Ok(())
        }
    }
}
