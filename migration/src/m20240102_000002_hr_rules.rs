//! Salary-range trigger and the business-rule routines.
//!
//! Postgres gets plpgsql functions raising dedicated SQLSTATEs (`HR100` salary
//! out of range, `HR101` unknown job, `HR102` inverted salary band, `P0002`
//! missing job). SQLite has no stored routines; it only gets the trigger, and
//! the application issues plain DML in place of the routine calls.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

const PG_UP: &[&str] = &[
    r#"
CREATE OR REPLACE FUNCTION hr_check_salary_range() RETURNS trigger
LANGUAGE plpgsql AS $$
DECLARE
    v_min double precision;
    v_max double precision;
BEGIN
    IF NEW.salary IS NULL THEN
        RETURN NEW;
    END IF;
    SELECT min_salary, max_salary INTO v_min, v_max FROM jobs WHERE job_id = NEW.job_id;
    IF NOT FOUND THEN
        RETURN NEW;
    END IF;
    IF (v_min IS NOT NULL AND NEW.salary < v_min) OR (v_max IS NOT NULL AND NEW.salary > v_max) THEN
        RAISE EXCEPTION 'Salary % is out of range for job % (% - %)',
            NEW.salary, NEW.job_id, COALESCE(v_min::text, '-'), COALESCE(v_max::text, '-')
            USING ERRCODE = 'HR100';
    END IF;
    RETURN NEW;
END;
$$
"#,
    "DROP TRIGGER IF EXISTS employees_salary_range ON employees",
    r#"
CREATE TRIGGER employees_salary_range
    BEFORE INSERT OR UPDATE OF salary, job_id ON employees
    FOR EACH ROW EXECUTE FUNCTION hr_check_salary_range()
"#,
    r#"
CREATE OR REPLACE FUNCTION hr_hire_employee(
    p_first_name varchar,
    p_last_name varchar,
    p_email varchar,
    p_phone_number varchar,
    p_job_id varchar,
    p_salary double precision,
    p_commission_pct double precision,
    p_manager_id integer,
    p_department_id integer
) RETURNS integer
LANGUAGE plpgsql AS $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM jobs WHERE job_id = p_job_id) THEN
        RAISE EXCEPTION 'Invalid job ID specified: %', p_job_id USING ERRCODE = 'HR101';
    END IF;
    INSERT INTO employees (
        first_name, last_name, email, phone_number, hire_date,
        job_id, salary, commission_pct, manager_id, department_id
    ) VALUES (
        p_first_name, p_last_name, p_email, p_phone_number, CURRENT_DATE,
        p_job_id, p_salary, p_commission_pct, p_manager_id, p_department_id
    );
    RETURN 1;
END;
$$
"#,
    r#"
CREATE OR REPLACE FUNCTION hr_new_job(
    p_job_id varchar,
    p_job_title varchar,
    p_min_salary double precision,
    p_max_salary double precision
) RETURNS integer
LANGUAGE plpgsql AS $$
BEGIN
    IF p_min_salary IS NOT NULL AND p_max_salary IS NOT NULL AND p_min_salary > p_max_salary THEN
        RAISE EXCEPTION 'Minimum salary cannot be greater than maximum salary' USING ERRCODE = 'HR102';
    END IF;
    INSERT INTO jobs (job_id, job_title, min_salary, max_salary)
    VALUES (UPPER(p_job_id), p_job_title, p_min_salary, p_max_salary);
    RETURN 1;
END;
$$
"#,
    r#"
CREATE OR REPLACE FUNCTION hr_update_job_info(
    p_job_id varchar,
    p_job_title varchar,
    p_min_salary double precision,
    p_max_salary double precision
) RETURNS integer
LANGUAGE plpgsql AS $$
DECLARE
    v_rows integer;
BEGIN
    IF p_min_salary IS NOT NULL AND p_max_salary IS NOT NULL AND p_min_salary > p_max_salary THEN
        RAISE EXCEPTION 'Minimum salary cannot be greater than maximum salary' USING ERRCODE = 'HR102';
    END IF;
    UPDATE jobs
       SET job_title = p_job_title, min_salary = p_min_salary, max_salary = p_max_salary
     WHERE job_id = p_job_id;
    GET DIAGNOSTICS v_rows = ROW_COUNT;
    IF v_rows = 0 THEN
        RAISE EXCEPTION 'Job % not found', p_job_id USING ERRCODE = 'P0002';
    END IF;
    RETURN v_rows;
END;
$$
"#,
    r#"
CREATE OR REPLACE FUNCTION hr_job_description(p_job_id varchar) RETURNS varchar
LANGUAGE sql STABLE AS $$
    SELECT job_title FROM jobs WHERE job_id = p_job_id
$$
"#,
];

const PG_DOWN: &[&str] = &[
    "DROP FUNCTION IF EXISTS hr_job_description(varchar)",
    "DROP FUNCTION IF EXISTS hr_update_job_info(varchar, varchar, double precision, double precision)",
    "DROP FUNCTION IF EXISTS hr_new_job(varchar, varchar, double precision, double precision)",
    "DROP FUNCTION IF EXISTS hr_hire_employee(varchar, varchar, varchar, varchar, varchar, double precision, double precision, integer, integer)",
    "DROP TRIGGER IF EXISTS employees_salary_range ON employees",
    "DROP FUNCTION IF EXISTS hr_check_salary_range()",
];

const SQLITE_UP: &[&str] = &[
    r#"
CREATE TRIGGER IF NOT EXISTS employees_salary_range_insert
BEFORE INSERT ON employees
FOR EACH ROW WHEN NEW.salary IS NOT NULL AND EXISTS (
    SELECT 1 FROM jobs j
     WHERE j.job_id = NEW.job_id
       AND ((j.min_salary IS NOT NULL AND NEW.salary < j.min_salary)
         OR (j.max_salary IS NOT NULL AND NEW.salary > j.max_salary))
)
BEGIN
    SELECT RAISE(ABORT, 'Salary is out of range for the selected job position');
END
"#,
    r#"
CREATE TRIGGER IF NOT EXISTS employees_salary_range_update
BEFORE UPDATE OF salary, job_id ON employees
FOR EACH ROW WHEN NEW.salary IS NOT NULL AND EXISTS (
    SELECT 1 FROM jobs j
     WHERE j.job_id = NEW.job_id
       AND ((j.min_salary IS NOT NULL AND NEW.salary < j.min_salary)
         OR (j.max_salary IS NOT NULL AND NEW.salary > j.max_salary))
)
BEGIN
    SELECT RAISE(ABORT, 'Salary is out of range for the selected job position');
END
"#,
];

const SQLITE_DOWN: &[&str] = &[
    "DROP TRIGGER IF EXISTS employees_salary_range_update",
    "DROP TRIGGER IF EXISTS employees_salary_range_insert",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statements = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => SQLITE_UP,
            _ => PG_UP,
        };
        run_all(manager, statements).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statements = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => SQLITE_DOWN,
            _ => PG_DOWN,
        };
        run_all(manager, statements).await
    }
}

async fn run_all(manager: &SchemaManager<'_>, statements: &[&str]) -> Result<(), DbErr> {
    let conn = manager.get_connection();
    for sql in statements {
        conn.execute_unprepared(sql).await?;
    }
    Ok(())
}
