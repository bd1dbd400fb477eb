//! Business-rule routines.
//!
//! On Postgres these are plpgsql functions installed by the migrations; each
//! returns the number of rows it wrote. SQLite has no stored routines, so the
//! same effect is expressed as one DML statement and the salary trigger still
//! enforces the job's range.

use anyhow::anyhow;
use platform_api::ApiError;
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement, Value};

use crate::dispatch::{Action, Target};
use crate::input::{EmployeeRecord, JobInfo, JobRecord};

const PG_HIRE_EMPLOYEE: &str = "SELECT hr_hire_employee(\
    $1::varchar, $2::varchar, $3::varchar, $4::varchar, $5::varchar, \
    $6::double precision, $7::double precision, $8::integer, $9::integer) AS affected";
const PG_NEW_JOB: &str = "SELECT hr_new_job(\
    $1::varchar, $2::varchar, $3::double precision, $4::double precision) AS affected";
const PG_UPDATE_JOB_INFO: &str = "SELECT hr_update_job_info(\
    $1::varchar, $2::varchar, $3::double precision, $4::double precision) AS affected";
const PG_JOB_DESCRIPTION: &str = "SELECT hr_job_description($1::varchar) AS job_description";

const DML_HIRE_EMPLOYEE: &str = "INSERT INTO employees (\
    first_name, last_name, email, phone_number, hire_date, \
    job_id, salary, commission_pct, manager_id, department_id) \
    SELECT $1, $2, $3, $4, CURRENT_DATE, job_id, $6, $7, $8, $9 FROM jobs WHERE job_id = $5";
const DML_NEW_JOB: &str = "INSERT INTO jobs (job_id, job_title, min_salary, max_salary) \
    VALUES (UPPER($1), $2, $3, $4)";
const DML_UPDATE_JOB_INFO: &str = "UPDATE jobs \
    SET job_title = $2, min_salary = $3, max_salary = $4 WHERE job_id = $1";
const DML_JOB_DESCRIPTION: &str =
    "SELECT job_title AS job_description FROM jobs WHERE job_id = $1";

/// A call into one of the store's business-rule routines.
#[derive(Clone, Copy, Debug)]
pub enum Routine<'a> {
    HireEmployee(&'a EmployeeRecord),
    NewJob(&'a JobRecord),
    UpdateJobInfo { job_id: &'a str, info: &'a JobInfo },
}

impl Routine<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Routine::HireEmployee(_) => "hr_hire_employee",
            Routine::NewJob(_) => "hr_new_job",
            Routine::UpdateJobInfo { .. } => "hr_update_job_info",
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Routine::HireEmployee(_) => Target::Employee,
            Routine::NewJob(_) | Routine::UpdateJobInfo { .. } => Target::Job,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Routine::HireEmployee(_) | Routine::NewJob(_) => Action::Create,
            Routine::UpdateJobInfo { .. } => Action::Update,
        }
    }

    fn values(&self) -> Vec<Value> {
        match self {
            Routine::HireEmployee(record) => vec![
                record.first_name.clone().into(),
                record.last_name.clone().into(),
                record.email.clone().into(),
                record.phone_number.clone().into(),
                record.job_id.clone().into(),
                record.salary.into(),
                record.commission_pct.into(),
                record.manager_id.into(),
                record.department_id.into(),
            ],
            Routine::NewJob(job) => vec![
                job.job_id.clone().into(),
                job.job_title.clone().into(),
                job.min_salary.into(),
                job.max_salary.into(),
            ],
            Routine::UpdateJobInfo { job_id, info } => vec![
                job_id.to_string().into(),
                info.job_title.clone().into(),
                info.min_salary.into(),
                info.max_salary.into(),
            ],
        }
    }

    pub fn statement(&self, backend: DatabaseBackend) -> Statement {
        let sql = match (backend, self) {
            (DatabaseBackend::Postgres, Routine::HireEmployee(_)) => PG_HIRE_EMPLOYEE,
            (DatabaseBackend::Postgres, Routine::NewJob(_)) => PG_NEW_JOB,
            (DatabaseBackend::Postgres, Routine::UpdateJobInfo { .. }) => PG_UPDATE_JOB_INFO,
            (_, Routine::HireEmployee(_)) => DML_HIRE_EMPLOYEE,
            (_, Routine::NewJob(_)) => DML_NEW_JOB,
            (_, Routine::UpdateJobInfo { .. }) => DML_UPDATE_JOB_INFO,
        };
        Statement::from_sql_and_values(backend, sql, self.values())
    }

    /// Run the routine and return how many rows it wrote.
    pub(crate) async fn run<C: ConnectionTrait>(&self, conn: &C) -> Result<u64, DbErr> {
        let backend = conn.get_database_backend();
        let statement = self.statement(backend);
        if backend != DatabaseBackend::Postgres {
            return Ok(conn.execute(statement).await?.rows_affected());
        }
        let row = conn
            .query_one(statement)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} returned no row", self.name())))?;
        let affected: Option<i32> = row.try_get("", "affected")?;
        Ok(affected.unwrap_or(0).max(0) as u64)
    }

    /// The error for a routine that completed without writing anything.
    pub(crate) fn nothing_written(&self) -> ApiError {
        match self {
            Routine::HireEmployee(record) => {
                ApiError::BusinessRule(format!("Invalid job ID specified: {}", record.job_id))
            }
            Routine::UpdateJobInfo { .. } => Target::Job.not_found(),
            Routine::NewJob(_) => ApiError::internal(anyhow!("hr_new_job wrote no row")),
        }
    }
}

/// Look up a job's title through `hr_job_description`.
pub fn job_description(backend: DatabaseBackend, job_id: &str) -> Statement {
    let sql = match backend {
        DatabaseBackend::Postgres => PG_JOB_DESCRIPTION,
        _ => DML_JOB_DESCRIPTION,
    };
    Statement::from_sql_and_values(backend, sql, [job_id.to_string().into()])
}
