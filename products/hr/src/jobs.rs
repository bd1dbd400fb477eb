use entity::jobs;
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    Statement,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    dispatch::{self, Action, Target},
    input::{JobInfo, JobInput},
    read_failed,
    references::{self, Guarded},
    routines::{self, Routine},
    validate,
};

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub job_id: String,
    pub job_title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub employee_count: i64,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub job_id: String,
    pub job_title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult)]
struct JobAggregate {
    job_id: String,
    job_title: String,
    min_salary: Option<f64>,
    max_salary: Option<f64>,
    employee_count: i64,
    actual_average_salary: Option<f64>,
    actual_min_salary: Option<f64>,
    actual_max_salary: Option<f64>,
    total_salary_cost: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatsRow {
    pub job_id: String,
    pub job_title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub employee_count: i64,
    pub actual_average_salary: Option<f64>,
    pub actual_min_salary: Option<f64>,
    pub actual_max_salary: Option<f64>,
    pub total_salary_cost: Option<f64>,
    /// Where the average salary sits inside the job's band, in percent.
    pub salary_range_utilization_pct: Option<f64>,
}

impl From<JobAggregate> for JobStatsRow {
    fn from(row: JobAggregate) -> Self {
        let salary_range_utilization_pct = if row.employee_count > 0 {
            utilization(row.actual_average_salary, row.min_salary, row.max_salary)
        } else {
            None
        };
        Self {
            job_id: row.job_id,
            job_title: row.job_title,
            min_salary: row.min_salary,
            max_salary: row.max_salary,
            employee_count: row.employee_count,
            actual_average_salary: row.actual_average_salary,
            actual_min_salary: row.actual_min_salary,
            actual_max_salary: row.actual_max_salary,
            total_salary_cost: row.total_salary_cost,
            salary_range_utilization_pct,
        }
    }
}

fn utilization(average: Option<f64>, min: Option<f64>, max: Option<f64>) -> Option<f64> {
    let (average, min, max) = (average?, min?, max?);
    let width = max - min;
    if width <= 0.0 {
        return None;
    }
    Some(((average - min) / width * 10_000.0).round() / 100.0)
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub vacant_jobs: i64,
    pub average_min_salary: Option<f64>,
    pub average_max_salary: Option<f64>,
    pub lowest_min_salary: Option<f64>,
    pub highest_max_salary: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub job_stats: Vec<JobStatsRow>,
    pub summary: JobSummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub job_title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub job_id: String,
    pub job_description: String,
}

#[derive(Debug, FromQueryResult)]
struct DescriptionRow {
    job_description: Option<String>,
}

fn info_columns(info: &JobInfo) -> jobs::ActiveModel {
    jobs::ActiveModel {
        job_id: NotSet,
        job_title: Set(info.job_title.clone()),
        min_salary: Set(info.min_salary),
        max_salary: Set(info.max_salary),
    }
}

#[instrument(name = "hr.jobs.create", skip_all)]
pub async fn create<C: ConnectionTrait>(conn: &C, input: &JobInput) -> ApiResult<JobCreated> {
    let record = validate::job(input)?;
    let active = jobs::ActiveModel {
        job_id: Set(record.job_id.clone()),
        job_title: Set(record.job_title.clone()),
        min_salary: Set(record.min_salary),
        max_salary: Set(record.max_salary),
    };
    dispatch::write(conn, Target::Job, Action::Create, jobs::Entity::insert(active)).await?;
    info!(job_id = %record.job_id, "job created");
    Ok(JobCreated {
        job_id: record.job_id,
        job_title: record.job_title,
    })
}

/// Create through `hr_new_job`.
#[instrument(name = "hr.jobs.new_job", skip_all)]
pub async fn new_job<C: ConnectionTrait>(conn: &C, input: &JobInput) -> ApiResult<JobCreated> {
    let record = validate::job(input)?;
    dispatch::call(conn, &Routine::NewJob(&record)).await?;
    info!(job_id = %record.job_id, "job created by routine");
    Ok(JobCreated {
        job_id: record.job_id,
        job_title: record.job_title,
    })
}

/// Replace title and salary band. The id in the path wins over any in the body.
#[instrument(name = "hr.jobs.update", skip_all, fields(job_id = %id))]
pub async fn update<C: ConnectionTrait>(conn: &C, id: &str, input: &JobInput) -> ApiResult<()> {
    let info = validate::job_info(input)?;
    let query = jobs::Entity::update_many()
        .set(info_columns(&info))
        .filter(jobs::Column::JobId.eq(validate::job_key(id)));
    dispatch::write(conn, Target::Job, Action::Update, query).await?;
    info!("job updated");
    Ok(())
}

/// Same as [`update`] but through `hr_update_job_info`.
#[instrument(name = "hr.jobs.update_info", skip_all, fields(job_id = %id))]
pub async fn update_info<C: ConnectionTrait>(
    conn: &C,
    id: &str,
    input: &JobInput,
) -> ApiResult<()> {
    let info = validate::job_info(input)?;
    let job_id = validate::job_key(id);
    dispatch::call(conn, &Routine::UpdateJobInfo { job_id: &job_id, info: &info }).await?;
    info!("job info updated by routine");
    Ok(())
}

/// Refuses while any employee still holds the job.
#[instrument(name = "hr.jobs.delete", skip_all, fields(job_id = %id))]
pub async fn delete<C: ConnectionTrait>(conn: &C, id: &str) -> ApiResult<()> {
    let job_id = validate::job_key(id);
    references::ensure_unreferenced(conn, Guarded::Job(&job_id)).await?;
    dispatch::write(
        conn,
        Target::Job,
        Action::Delete,
        jobs::Entity::delete_by_id(job_id),
    )
    .await?;
    info!("job deleted");
    Ok(())
}

pub async fn list<C: ConnectionTrait>(conn: &C) -> ApiResult<Vec<JobRow>> {
    let stmt = Statement::from_string(
        conn.get_database_backend(),
        "SELECT j.job_id, j.job_title, j.min_salary, j.max_salary, \
         COUNT(e.employee_id) AS employee_count \
         FROM jobs j LEFT JOIN employees e ON j.job_id = e.job_id \
         GROUP BY j.job_id, j.job_title, j.min_salary, j.max_salary \
         ORDER BY j.job_title",
    );
    JobRow::find_by_statement(stmt)
        .all(conn)
        .await
        .map_err(read_failed)
}

pub async fn get<C: ConnectionTrait>(conn: &C, id: &str) -> ApiResult<JobDetail> {
    jobs::Entity::find_by_id(validate::job_key(id))
        .select_only()
        .columns([
            jobs::Column::JobId,
            jobs::Column::JobTitle,
            jobs::Column::MinSalary,
            jobs::Column::MaxSalary,
        ])
        .into_model::<JobDetail>()
        .one(conn)
        .await
        .map_err(read_failed)?
        .ok_or_else(|| Target::Job.not_found())
}

/// Title of a job as reported by `hr_job_description`.
pub async fn description<C: ConnectionTrait>(conn: &C, id: &str) -> ApiResult<JobDescription> {
    let job_id = validate::job_key(id);
    let stmt = routines::job_description(conn.get_database_backend(), &job_id);
    let found = DescriptionRow::find_by_statement(stmt)
        .one(conn)
        .await
        .map_err(read_failed)?
        .and_then(|row| row.job_description);
    match found {
        Some(job_description) => Ok(JobDescription {
            job_id,
            job_description,
        }),
        None => Err(Target::Job.not_found()),
    }
}

pub async fn stats<C: ConnectionTrait>(conn: &C) -> ApiResult<JobStats> {
    let backend = conn.get_database_backend();
    let job_stats = JobAggregate::find_by_statement(Statement::from_string(
        backend,
        "SELECT j.job_id, j.job_title, j.min_salary, j.max_salary, \
         COUNT(e.employee_id) AS employee_count, \
         AVG(e.salary) AS actual_average_salary, \
         MIN(e.salary) AS actual_min_salary, \
         MAX(e.salary) AS actual_max_salary, \
         SUM(e.salary) AS total_salary_cost \
         FROM jobs j LEFT JOIN employees e ON j.job_id = e.job_id \
         GROUP BY j.job_id, j.job_title, j.min_salary, j.max_salary \
         ORDER BY employee_count DESC, j.job_title",
    ))
    .all(conn)
    .await
    .map_err(read_failed)?
    .into_iter()
    .map(JobStatsRow::from)
    .collect();

    let summary = JobSummary::find_by_statement(Statement::from_string(
        backend,
        "SELECT COUNT(*) AS total_jobs, \
         COUNT(CASE WHEN EXISTS (SELECT 1 FROM employees e WHERE e.job_id = j.job_id) THEN 1 END) AS active_jobs, \
         COUNT(CASE WHEN NOT EXISTS (SELECT 1 FROM employees e WHERE e.job_id = j.job_id) THEN 1 END) AS vacant_jobs, \
         AVG(j.min_salary) AS average_min_salary, AVG(j.max_salary) AS average_max_salary, \
         MIN(j.min_salary) AS lowest_min_salary, MAX(j.max_salary) AS highest_max_salary \
         FROM jobs j",
    ))
    .one(conn)
    .await
    .map_err(read_failed)?
    .ok_or_else(|| ApiError::internal(anyhow::anyhow!("job summary returned no row")))?;

    Ok(JobStats { job_stats, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{employees, input::EmployeeInput, testing};

    fn job(id: &str) -> JobInput {
        JobInput {
            job_id: Some(id.into()),
            job_title: Some("Stock Clerk".into()),
            min_salary: Some(2000.0),
            max_salary: Some(5000.0),
        }
    }

    #[test]
    fn utilization_is_rounded_and_needs_a_band() {
        assert_eq!(utilization(Some(7000.0), Some(4000.0), Some(10000.0)), Some(50.0));
        assert_eq!(utilization(Some(5000.0), Some(4000.0), Some(7000.0)), Some(33.33));
        assert_eq!(utilization(Some(5000.0), Some(5000.0), Some(5000.0)), None);
        assert_eq!(utilization(None, Some(1.0), Some(2.0)), None);
    }

    #[tokio::test]
    async fn create_update_and_read_a_job() {
        let db = testing::database().await;
        create(&db, &job("ST_CLERK")).await.unwrap();
        let detail = get(&db, "ST_CLERK").await.unwrap();
        assert_eq!(detail.max_salary, Some(5000.0));

        let change = JobInput {
            job_title: Some("Senior Clerk".into()),
            ..job("IGNORED_BY_UPDATE")
        };
        update(&db, "ST_CLERK", &change).await.unwrap();
        assert_eq!(get(&db, "ST_CLERK").await.unwrap().job_title, "Senior Clerk");

        assert_eq!(
            create(&db, &job("ST_CLERK")).await.unwrap_err(),
            ApiError::Conflict("Job with this ID already exists".into())
        );
    }

    #[tokio::test]
    async fn routine_paths_upper_case_and_report_missing_jobs() {
        let db = testing::database().await;
        let created = new_job(&db, &job("sh_clerk")).await.unwrap();
        assert_eq!(created.job_id, "SH_CLERK");
        assert!(get(&db, "SH_CLERK").await.is_ok());

        update_info(&db, "SH_CLERK", &job("x")).await.unwrap();
        assert_eq!(
            update_info(&db, "MISSING", &job("x")).await.unwrap_err(),
            ApiError::NotFound("Job not found".into())
        );
    }

    #[tokio::test]
    async fn description_matches_ids_case_insensitively() {
        let db = testing::database().await;
        let found = description(&db, "it_prog").await.unwrap();
        assert_eq!(found.job_id, "IT_PROG");
        assert_eq!(found.job_description, "Programmer");
        assert!(matches!(
            description(&db, "nope").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn plain_create_stores_ids_the_way_lookups_find_them() {
        let db = testing::database().await;
        let created = create(&db, &job("qa_lead")).await.unwrap();
        assert_eq!(created.job_id, "QA_LEAD");
        assert_eq!(get(&db, "qa_lead").await.unwrap().job_id, "QA_LEAD");
        assert_eq!(
            description(&db, "qa_lead").await.unwrap().job_description,
            "Stock Clerk"
        );
        delete(&db, "qa_lead").await.unwrap();
        assert!(matches!(get(&db, "QA_LEAD").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn held_jobs_cannot_be_deleted() {
        let db = testing::database().await;
        employees::create(
            &db,
            &EmployeeInput {
                first_name: Some("Steven".into()),
                last_name: Some("King".into()),
                email: Some("SKING".into()),
                job_id: Some("AD_PRES".into()),
                salary: Some(24000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            delete(&db, "AD_PRES").await,
            Err(ApiError::InUse(_))
        ));
        delete(&db, "IT_PROG").await.unwrap();
        assert!(matches!(
            delete(&db, "IT_PROG").await,
            Err(ApiError::NotFound(_))
        ));

        let stats = stats(&db).await.unwrap();
        assert_eq!(stats.summary.total_jobs, 1);
        assert_eq!(stats.summary.active_jobs, 1);
        assert_eq!(stats.job_stats[0].salary_range_utilization_pct, Some(20.0));
        assert_eq!(list(&db).await.unwrap()[0].employee_count, 1);
    }
}
