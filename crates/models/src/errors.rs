use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        ModelError::Db(e.to_string())
    }
}

/// Fails with `"<field>: <reason>"`, the shape every validator in this crate uses.
pub(crate) fn invalid(field: &str, reason: &str) -> ModelError {
    ModelError::Validation(format!("{field}: {reason}"))
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "required"));
    }
    Ok(())
}
