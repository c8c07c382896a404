use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{invalid, require_non_blank, ModelError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Encoded password hash. Never leaves the process.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    require_non_blank("username", username)?;
    if username.chars().count() < 3 {
        return Err(invalid("username", "must be at least 3 characters"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("email", "invalid email"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(invalid("email", "invalid email"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.chars().count() < 8 {
        return Err(invalid("password", "must be at least 8 characters"));
    }
    Ok(())
}
