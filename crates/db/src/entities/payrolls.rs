//! `SeaORM` Entity for payrolls table.

use super::sea_orm_active_enums::PayrollStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payrolls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subject: String,
    pub pay_period: String,
    pub payroll_date: Date,
    pub employee_count: i32,
    pub status: PayrollStatus,
    pub approver_id: Option<Uuid>,
    pub generated_by: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub due_amount: Decimal,
    pub run_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payroll_employees::Entity")]
    PayrollEmployees,
    #[sea_orm(has_many = "super::salaries::Entity")]
    Salaries,
}

impl Related<super::payroll_employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollEmployees.def()
    }
}

impl Related<super::salaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Salaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
