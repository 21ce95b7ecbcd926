use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ActiveValue::Set, Iterable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Cities a property can be listed in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(100))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum City {
    #[sea_orm(string_value = "yaounde")]
    Yaounde,
    #[sea_orm(string_value = "douala")]
    Douala,
    #[sea_orm(string_value = "bafoussam")]
    Bafoussam,
    #[sea_orm(string_value = "bamenda")]
    Bamenda,
    #[sea_orm(string_value = "garoua")]
    Garoua,
    #[sea_orm(string_value = "maroua")]
    Maroua,
    #[sea_orm(string_value = "ngaoundere")]
    Ngaoundere,
    #[sea_orm(string_value = "bertoua")]
    Bertoua,
    #[sea_orm(string_value = "ebolowa")]
    Ebolowa,
    #[sea_orm(string_value = "kribi")]
    Kribi,
    #[sea_orm(string_value = "limbe")]
    Limbe,
    #[sea_orm(string_value = "buea")]
    Buea,
    #[sea_orm(string_value = "kumba")]
    Kumba,
    #[sea_orm(string_value = "dschang")]
    Dschang,
    #[sea_orm(string_value = "nkongsamba")]
    Nkongsamba,
    #[sea_orm(string_value = "edea")]
    Edea,
    #[sea_orm(string_value = "mbalmayo")]
    Mbalmayo,
    #[sea_orm(string_value = "sangmelima")]
    Sangmelima,
    #[sea_orm(string_value = "meiganga")]
    Meiganga,
    #[sea_orm(string_value = "kousseri")]
    Kousseri,
}

impl City {
    /// Human readable name, with accents.
    pub fn label(&self) -> &'static str {
        match self {
            City::Yaounde => "Yaoundé",
            City::Douala => "Douala",
            City::Bafoussam => "Bafoussam",
            City::Bamenda => "Bamenda",
            City::Garoua => "Garoua",
            City::Maroua => "Maroua",
            City::Ngaoundere => "Ngaoundéré",
            City::Bertoua => "Bertoua",
            City::Ebolowa => "Ebolowa",
            City::Kribi => "Kribi",
            City::Limbe => "Limbé",
            City::Buea => "Buéa",
            City::Kumba => "Kumba",
            City::Dschang => "Dschang",
            City::Nkongsamba => "Nkongsamba",
            City::Edea => "Edéa",
            City::Mbalmayo => "Mbalmayo",
            City::Sangmelima => "Sangmélima",
            City::Meiganga => "Meiganga",
            City::Kousseri => "Kousséri",
        }
    }

    /// Cities whose slug or display label contains `term`, ignoring case.
    pub fn matching(term: &str) -> Vec<City> {
        let needle = term.to_lowercase();
        City::iter()
            .filter(|city| {
                city.to_string().contains(&needle) || city.label().to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropertyType {
    #[sea_orm(string_value = "apartment")]
    Apartment,
    #[sea_orm(string_value = "house")]
    House,
    #[sea_orm(string_value = "land")]
    Land,
    #[sea_orm(string_value = "commercial")]
    Commercial,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: String,
    pub city: City,
    pub surface_area_m2: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub monthly_rent: Decimal,
    pub property_type: PropertyType,
    /// Derived from the lease set; written only by the availability reconciler.
    pub disponible: bool,
    pub exige_validation_contrat: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::OwnerId",
        to = "super::owner::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::lease::Entity")]
    Leases,
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leases.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            active_model.created_at = Set(Utc::now());
            // A fresh listing has no leases yet.
            active_model.disponible = Set(true);
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn city_search_matches_slug_and_accented_label() {
        assert_eq!(City::matching("YAOU"), vec![City::Yaounde]);
        assert_eq!(City::matching("ndéré"), vec![City::Ngaoundere]);
        assert!(City::matching("nowhere").is_empty());
    }

    #[test]
    fn enums_round_trip_through_slugs() {
        assert_eq!(City::from_str("sangmelima").unwrap(), City::Sangmelima);
        assert_eq!(PropertyType::Commercial.to_string(), "commercial");
        assert!(PropertyType::from_str("castle").is_err());
    }
}
