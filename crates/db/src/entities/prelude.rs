//! Entity re-exports.

pub use super::employee_bank_details::Entity as EmployeeBankDetails;
pub use super::employee_salary_components::Entity as EmployeeSalaryComponents;
pub use super::employee_transaction_categories::Entity as EmployeeTransactionCategories;
pub use super::employees::Entity as Employees;
pub use super::employments::Entity as Employments;
pub use super::journal_line_items::Entity as JournalLineItems;
pub use super::journals::Entity as Journals;
pub use super::payroll_employees::Entity as PayrollEmployees;
pub use super::payrolls::Entity as Payrolls;
pub use super::salaries::Entity as Salaries;
pub use super::salary_components::Entity as SalaryComponents;
pub use super::transaction_categories::Entity as TransactionCategories;
pub use super::users::Entity as Users;
