//! `SeaORM` active enums for the payroll schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payroll_status")]
pub enum PayrollStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Submitted")]
    Submitted,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Partially Paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "Voided")]
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "posting_reference_type")]
pub enum PostingReferenceType {
    #[sea_orm(string_value = "PAYROLL_APPROVED")]
    PayrollApproved,
    #[sea_orm(string_value = "PAYROLL_VOIDED")]
    PayrollVoided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wage_role")]
pub enum WageRole {
    #[sea_orm(string_value = "salary_payable")]
    SalaryPayable,
    #[sea_orm(string_value = "wages_expense")]
    WagesExpense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ctc_type")]
pub enum CtcType {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "annual")]
    Annual,
}
