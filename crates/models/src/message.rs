use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{require_non_blank, ModelError};
use crate::{business, user};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub business_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// True when the message travels between `a` and `b` in either direction.
    pub fn is_between(&self, a: i32, b: i32) -> bool {
        (self.sender_id == a && self.receiver_id == b) || (self.sender_id == b && self.receiver_id == a)
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Sender,
    Receiver,
    Business,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Sender => Entity::belongs_to(user::Entity).from(Column::SenderId).to(user::Column::Id).into(),
            Relation::Receiver => Entity::belongs_to(user::Entity).from(Column::ReceiverId).to(user::Column::Id).into(),
            Relation::Business => Entity::belongs_to(business::Entity).from(Column::BusinessId).to(business::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(content: &str) -> Result<(), ModelError> {
    require_non_blank("content", content)
}
