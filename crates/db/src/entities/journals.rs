//! `SeaORM` Entity for journals table.

use super::sea_orm_active_enums::PostingReferenceType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_date: Date,
    pub transaction_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub reference_type: PostingReferenceType,
    pub reverses_journal_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_line_items::Entity")]
    JournalLineItems,
}

impl Related<super::journal_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
