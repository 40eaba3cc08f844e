//! `SeaORM` Entity for journal_line_items table.

use super::sea_orm_active_enums::PostingReferenceType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_id: Uuid,
    pub line_no: i32,
    pub transaction_category_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub credit: Decimal,
    pub reference_id: Uuid,
    pub reference_type: PostingReferenceType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id",
        on_delete = "Cascade"
    )]
    Journals,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
