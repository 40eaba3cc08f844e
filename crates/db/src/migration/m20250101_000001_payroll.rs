//! Initial payroll schema.
//!
//! Directory tables, the salary component catalog and assignments, payroll
//! runs with their roster and salary rows, and the journals payroll posts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DIRECTORY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(EMPLOYEES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(TRANSACTION_CATEGORIES_SQL).await?;

        // ============================================================
        // PART 4: SALARY STRUCTURE
        // ============================================================
        db.execute_unprepared(SALARY_COMPONENTS_SQL).await?;

        // ============================================================
        // PART 5: PAYROLL RUNS
        // ============================================================
        db.execute_unprepared(PAYROLLS_SQL).await?;

        // ============================================================
        // PART 6: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNALS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE payroll_status AS ENUM (
    'Draft',
    'Submitted',
    'Approved',
    'Partially Paid',
    'Paid',
    'Rejected',
    'Voided'
);

CREATE TYPE posting_reference_type AS ENUM ('PAYROLL_APPROVED', 'PAYROLL_VOIDED');

CREATE TYPE wage_role AS ENUM ('salary_payable', 'wages_expense');

CREATE TYPE ctc_type AS ENUM ('monthly', 'annual');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name VARCHAR(255) NOT NULL,
    last_name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name VARCHAR(255) NOT NULL,
    last_name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE employments (
    employee_id UUID PRIMARY KEY REFERENCES employees(id) ON DELETE CASCADE,
    gross_salary NUMERIC(19, 8),
    ctc_type ctc_type NOT NULL DEFAULT 'monthly',
    labour_card VARCHAR(64),
    agent_id VARCHAR(64)
);

CREATE TABLE employee_bank_details (
    employee_id UUID PRIMARY KEY REFERENCES employees(id) ON DELETE CASCADE,
    account_holder VARCHAR(255) NOT NULL,
    iban VARCHAR(34) NOT NULL
);
";

const TRANSACTION_CATEGORIES_SQL: &str = r"
CREATE TABLE transaction_categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL UNIQUE,
    description VARCHAR(255) NOT NULL DEFAULT '',
    account_group VARCHAR(255) NOT NULL,
    is_editable BOOLEAN NOT NULL DEFAULT true,
    is_selectable BOOLEAN NOT NULL DEFAULT true
);

CREATE TABLE employee_transaction_categories (
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    role wage_role NOT NULL,
    transaction_category_id UUID NOT NULL REFERENCES transaction_categories(id),
    PRIMARY KEY (employee_id, role)
);
";

const SALARY_COMPONENTS_SQL: &str = r"
CREATE TABLE salary_components (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    description VARCHAR(255) NOT NULL,
    component_code VARCHAR(32) NOT NULL,
    flat_amount NUMERIC(19, 8),
    formula NUMERIC(10, 4),
    component_type VARCHAR(64) NOT NULL,
    category_id INTEGER NOT NULL CHECK (category_id BETWEEN 1 AND 4),
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_component_amount CHECK (flat_amount IS NULL OR formula IS NULL)
);

CREATE TABLE employee_salary_components (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    salary_component_id UUID NOT NULL REFERENCES salary_components(id),
    category_id INTEGER NOT NULL CHECK (category_id BETWEEN 1 AND 4),
    description VARCHAR(255) NOT NULL,
    flat_amount NUMERIC(19, 8),
    formula NUMERIC(10, 4),
    monthly_amount NUMERIC(19, 8) NOT NULL,
    yearly_amount NUMERIC(19, 8) NOT NULL,
    no_of_days NUMERIC(10, 4) NOT NULL DEFAULT 30 CHECK (no_of_days > 0),
    UNIQUE (employee_id, salary_component_id)
);

CREATE INDEX idx_esc_employee ON employee_salary_components(employee_id);
";

const PAYROLLS_SQL: &str = r"
CREATE TABLE payrolls (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    subject VARCHAR(255) NOT NULL,
    pay_period VARCHAR(32) NOT NULL,
    payroll_date DATE NOT NULL,
    employee_count INTEGER NOT NULL DEFAULT 0,
    status payroll_status NOT NULL DEFAULT 'Draft',
    approver_id UUID REFERENCES users(id),
    generated_by UUID NOT NULL REFERENCES users(id),
    total_amount NUMERIC(19, 8) NOT NULL DEFAULT 0,
    due_amount NUMERIC(19, 8) NOT NULL DEFAULT 0,
    run_date TIMESTAMPTZ,
    comment TEXT
);

CREATE INDEX idx_payrolls_status ON payrolls(status);

CREATE TABLE payroll_employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payroll_id UUID NOT NULL REFERENCES payrolls(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES employees(id),
    UNIQUE (payroll_id, employee_id)
);

CREATE TABLE salaries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id UUID NOT NULL REFERENCES employees(id),
    payroll_id UUID REFERENCES payrolls(id) ON DELETE CASCADE,
    salary_component_id UUID REFERENCES salary_components(id),
    row_type INTEGER NOT NULL CHECK (row_type IN (0, 1)),
    no_of_days NUMERIC(10, 4) NOT NULL,
    lop_days NUMERIC(10, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(19, 8) NOT NULL,
    salary_date DATE NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_salaries_payroll ON salaries(payroll_id);
CREATE INDEX idx_salaries_date ON salaries(salary_date);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_date DATE NOT NULL,
    transaction_date DATE NOT NULL,
    description TEXT,
    reference_type posting_reference_type NOT NULL,
    reverses_journal_id UUID REFERENCES journals(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE journal_line_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    transaction_category_id UUID NOT NULL REFERENCES transaction_categories(id),
    debit NUMERIC(19, 8) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(19, 8) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    reference_id UUID NOT NULL,
    reference_type posting_reference_type NOT NULL,
    CONSTRAINT chk_one_sided CHECK (debit = 0 OR credit = 0)
);

CREATE INDEX idx_line_items_reference ON journal_line_items(reference_id, reference_type);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS journal_line_items CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS salaries CASCADE;
DROP TABLE IF EXISTS payroll_employees CASCADE;
DROP TABLE IF EXISTS payrolls CASCADE;
DROP TABLE IF EXISTS employee_salary_components CASCADE;
DROP TABLE IF EXISTS salary_components CASCADE;
DROP TABLE IF EXISTS employee_transaction_categories CASCADE;
DROP TABLE IF EXISTS transaction_categories CASCADE;
DROP TABLE IF EXISTS employee_bank_details CASCADE;
DROP TABLE IF EXISTS employments CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS ctc_type;
DROP TYPE IF EXISTS wage_role;
DROP TYPE IF EXISTS posting_reference_type;
DROP TYPE IF EXISTS payroll_status;
";
