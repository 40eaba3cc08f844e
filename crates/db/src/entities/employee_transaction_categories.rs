//! `SeaORM` Entity for employee_transaction_categories table.

use super::sea_orm_active_enums::WageRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_transaction_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub employee_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role: WageRole,
    pub transaction_category_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_categories::Entity",
        from = "Column::TransactionCategoryId",
        to = "super::transaction_categories::Column::Id"
    )]
    TransactionCategories,
}

impl Related<super::transaction_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
