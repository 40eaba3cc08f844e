//! `SeaORM` Entity for employee_salary_components table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_salary_components")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub salary_component_id: Uuid,
    pub category_id: i32,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))", nullable)]
    pub flat_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub formula: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub monthly_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 8)))")]
    pub yearly_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub no_of_days: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
