//! `SeaORM` entities for the payroll schema.

pub mod prelude;

pub mod employee_bank_details;
pub mod employee_salary_components;
pub mod employee_transaction_categories;
pub mod employees;
pub mod employments;
pub mod journal_line_items;
pub mod journals;
pub mod payroll_employees;
pub mod payrolls;
pub mod salaries;
pub mod salary_components;
pub mod sea_orm_active_enums;
pub mod transaction_categories;
pub mod users;
