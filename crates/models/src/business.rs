use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{invalid, require_non_blank, ModelError};
use crate::{category, user};

/// Listing lifecycle. Payment moves a listing to `Active`, cancellation to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl BusinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessStatus::Pending => "pending",
            BusinessStatus::Active => "active",
            BusinessStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "businesses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub owner_id: i32,
    pub category_id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub like_count: i32,
    pub comment_count: i32,
    /// Rounded mean of rated comments, 0 when none.
    pub rating: i32,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_paid: bool,
    pub status: BusinessStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub subscription_id: Option<i32>,
    pub subscription_expires_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Substring match of an already lowercased needle against the searchable
    /// text fields, folded with Unicode lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        [&self.name, &self.description, &self.city, &self.state]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Category,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity).from(Column::OwnerId).to(user::Column::Id).into(),
            Relation::Category => Entity::belongs_to(category::Entity).from(Column::CategoryId).to(category::Column::Id).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Required text fields of a listing, checked on create and on every patch that touches them.
pub fn validate_required(field: &str, value: &str) -> Result<(), ModelError> {
    require_non_blank(field, value)
}

pub fn validate_optional_email(email: Option<&str>) -> Result<(), ModelError> {
    match email {
        Some(e) if !e.is_empty() => crate::user::validate_email(e),
        _ => Ok(()),
    }
}

pub fn validate_optional_url(field: &str, url: Option<&str>) -> Result<(), ModelError> {
    match url {
        Some(u) if !u.is_empty() => {
            if u.starts_with("http://") || u.starts_with("https://") {
                Ok(())
            } else {
                Err(invalid(field, "must be an http(s) URL"))
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(BusinessStatus::Active).unwrap(), "active");
        let s: BusinessStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(s, BusinessStatus::Inactive);
        assert_eq!(BusinessStatus::default(), BusinessStatus::Pending);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let t: DateTimeWithTimeZone = chrono::Utc::now().into();
        let b = Model {
            id: 1,
            name: "CAFÉ ÉCLAIR".into(),
            description: "Pastries".into(),
            owner_id: 1,
            category_id: 1,
            address: "1 Rue".into(),
            city: "Québec".into(),
            state: "QC".into(),
            zip_code: "G1R".into(),
            phone: None,
            email: None,
            website: None,
            image: None,
            like_count: 0,
            comment_count: 0,
            rating: 0,
            is_verified: false,
            is_active: true,
            is_paid: false,
            status: BusinessStatus::Pending,
            created_at: t,
            updated_at: t,
            subscription_id: None,
            subscription_expires_at: None,
        };
        assert!(b.matches_search("café"));
        assert!(b.matches_search("québec"));
        assert!(b.matches_search("pastr"));
        assert!(!b.matches_search("tea"));
    }

    #[test]
    fn optional_contact_fields() {
        assert!(validate_optional_email(None).is_ok());
        assert!(validate_optional_email(Some("")).is_ok());
        assert!(validate_optional_email(Some("shop@x.io")).is_ok());
        assert!(validate_optional_email(Some("nope")).is_err());
        assert!(validate_optional_url("website", Some("https://x.io")).is_ok());
        assert!(validate_optional_url("website", Some("ftp://x.io")).is_err());
    }
}
