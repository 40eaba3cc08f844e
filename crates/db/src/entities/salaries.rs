//! `SeaORM` Entity for salaries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "salaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub payroll_id: Option<Uuid>,
    pub salary_component_id: Option<Uuid>,
    pub row_type: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub no_of_days: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub lop_days: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub total_amount: Decimal,
    pub salary_date: Date,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payrolls::Entity",
        from = "Column::PayrollId",
        to = "super::payrolls::Column::Id",
        on_delete = "Cascade"
    )]
    Payrolls,
}

impl Related<super::payrolls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payrolls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
