//! `SeaORM` Entity for employees table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::employments::Entity")]
    Employments,
    #[sea_orm(has_one = "super::employee_bank_details::Entity")]
    EmployeeBankDetails,
    #[sea_orm(has_many = "super::employee_salary_components::Entity")]
    EmployeeSalaryComponents,
}

impl Related<super::employments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employments.def()
    }
}

impl Related<super::employee_bank_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeBankDetails.def()
    }
}

impl Related<super::employee_salary_components::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeSalaryComponents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
