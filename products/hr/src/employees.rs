use chrono::NaiveDate;
use entity::employees;
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    Statement, Value,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    Listing, PageRequest, Pagination,
    dispatch::{self, Action, Target},
    input::{EmployeeInput, EmployeeRecord},
    read_failed,
    references::{self, Reference},
    routines::Routine,
    validate,
};

const EMPLOYEE_SELECT: &str = "SELECT e.employee_id, e.first_name, e.last_name, e.email, \
    e.phone_number, e.hire_date, e.salary, e.commission_pct, \
    e.job_id, j.job_title, e.department_id, d.department_name, \
    e.manager_id, m.first_name || ' ' || m.last_name AS manager_name \
    FROM employees e \
    LEFT JOIN jobs j ON e.job_id = j.job_id \
    LEFT JOIN departments d ON e.department_id = d.department_id \
    LEFT JOIN employees m ON e.manager_id = m.employee_id";

/// An employee with the names of the rows it references.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    pub employee_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub job_id: String,
    pub job_title: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub manager_id: Option<i32>,
    pub manager_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreated {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentHeadcount {
    pub department_name: String,
    pub employee_count: i64,
    pub average_salary: Option<f64>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub total_salary: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHeadcount {
    pub job_title: String,
    pub employee_count: i64,
    pub average_salary: Option<f64>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceSummary {
    pub total_employees: i64,
    pub overall_average_salary: Option<f64>,
    pub overall_min_salary: Option<f64>,
    pub overall_max_salary: Option<f64>,
    pub total_payroll: Option<f64>,
    pub top_level_managers: i64,
    pub employees_with_commission: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub department_stats: Vec<DepartmentHeadcount>,
    pub job_stats: Vec<JobHeadcount>,
    pub overall_stats: WorkforceSummary,
}

fn references(record: &EmployeeRecord) -> Vec<Reference<'_>> {
    let mut refs = vec![Reference::Job(&record.job_id)];
    refs.extend(record.manager_id.map(Reference::Manager));
    refs.extend(record.department_id.map(Reference::Department));
    refs
}

/// Every column a full-row write sets. Absent optionals are written as NULL.
fn columns(record: &EmployeeRecord) -> employees::ActiveModel {
    employees::ActiveModel {
        employee_id: NotSet,
        first_name: Set(record.first_name.clone()),
        last_name: Set(record.last_name.clone()),
        email: Set(record.email.clone()),
        phone_number: Set(record.phone_number.clone()),
        hire_date: NotSet,
        job_id: Set(record.job_id.clone()),
        salary: Set(record.salary),
        commission_pct: Set(record.commission_pct),
        manager_id: Set(record.manager_id),
        department_id: Set(record.department_id),
    }
}

/// Validate, check job/manager/department, insert. The hire date defaults to
/// the store's current date.
#[instrument(name = "hr.employees.create", skip_all)]
pub async fn create<C: ConnectionTrait>(
    conn: &C,
    input: &EmployeeInput,
) -> ApiResult<EmployeeCreated> {
    let record = validate::employee(input)?;
    references::ensure_exist(conn, &references(&record)).await?;

    let mut active = columns(&record);
    if let Some(hire_date) = record.hire_date {
        active.hire_date = Set(hire_date);
    }
    dispatch::write(conn, Target::Employee, Action::Create, employees::Entity::insert(active))
        .await?;
    info!(email = %record.email, "employee created");
    Ok(EmployeeCreated {
        email: record.email,
    })
}

/// Validate, check manager and department, then hand the insert to
/// `hr_hire_employee`. Job validity and the salary range are enforced by the
/// store, not pre-checked here.
#[instrument(name = "hr.employees.hire", skip_all)]
pub async fn hire<C: ConnectionTrait>(conn: &C, input: &EmployeeInput) -> ApiResult<EmployeeCreated> {
    let record = validate::employee(input)?;
    let refs: Vec<_> = references(&record)
        .into_iter()
        .filter(|reference| !matches!(reference, Reference::Job(_)))
        .collect();
    references::ensure_exist(conn, &refs).await?;
    dispatch::call(conn, &Routine::HireEmployee(&record)).await?;
    info!(email = %record.email, job_id = %record.job_id, "employee hired");
    Ok(EmployeeCreated {
        email: record.email,
    })
}

/// Full-row replacement. Optional fields missing from `input` are cleared;
/// the hire date is left as it was.
#[instrument(name = "hr.employees.update", skip_all, fields(employee_id = id))]
pub async fn update<C: ConnectionTrait>(conn: &C, id: i32, input: &EmployeeInput) -> ApiResult<()> {
    let record = validate::employee(input)?;
    references::ensure_exist(conn, &references(&record)).await?;

    let query = employees::Entity::update_many()
        .set(columns(&record))
        .filter(employees::Column::EmployeeId.eq(id));
    dispatch::write(conn, Target::Employee, Action::Update, query).await?;
    info!("employee updated");
    Ok(())
}

#[instrument(name = "hr.employees.delete", skip_all, fields(employee_id = id))]
pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> ApiResult<()> {
    dispatch::write(
        conn,
        Target::Employee,
        Action::Delete,
        employees::Entity::delete_by_id(id),
    )
    .await?;
    info!("employee deleted");
    Ok(())
}

async fn fetch<C: ConnectionTrait>(
    conn: &C,
    sql: String,
    values: Vec<Value>,
) -> ApiResult<Vec<EmployeeRow>> {
    let stmt = Statement::from_sql_and_values(conn.get_database_backend(), sql, values);
    EmployeeRow::find_by_statement(stmt)
        .all(conn)
        .await
        .map_err(read_failed)
}

pub async fn list<C: ConnectionTrait>(conn: &C, page: PageRequest) -> ApiResult<Listing<EmployeeRow>> {
    let Some(window) = page.window()? else {
        let rows = fetch(conn, format!("{EMPLOYEE_SELECT} ORDER BY e.employee_id"), vec![]).await?;
        return Ok(Listing::all(rows));
    };
    let rows = fetch(
        conn,
        format!("{EMPLOYEE_SELECT} ORDER BY e.employee_id LIMIT $1 OFFSET $2"),
        vec![(window.limit as i64).into(), window.offset.into()],
    )
    .await?;
    let total = employees::Entity::find()
        .count(conn)
        .await
        .map_err(read_failed)?;
    Ok(Listing::Page {
        data: rows,
        pagination: Pagination::new(window.page, window.limit, total),
    })
}

/// Case-insensitive substring match over names, email, id, job title and
/// department name.
pub async fn search<C: ConnectionTrait>(conn: &C, term: &str) -> ApiResult<Vec<EmployeeRow>> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ApiError::validation(
            "q",
            "Search query parameter \"q\" is required",
        ));
    }
    let pattern = format!("%{}%", term.to_lowercase());
    fetch(
        conn,
        format!(
            "{EMPLOYEE_SELECT} \
             WHERE LOWER(e.first_name) LIKE $1 \
                OR LOWER(e.last_name) LIKE $1 \
                OR LOWER(e.email) LIKE $1 \
                OR CAST(e.employee_id AS TEXT) LIKE $1 \
                OR LOWER(j.job_title) LIKE $1 \
                OR LOWER(d.department_name) LIKE $1 \
             ORDER BY e.last_name, e.first_name"
        ),
        vec![pattern.into()],
    )
    .await
}

pub async fn get<C: ConnectionTrait>(conn: &C, id: i32) -> ApiResult<EmployeeRow> {
    fetch(
        conn,
        format!("{EMPLOYEE_SELECT} WHERE e.employee_id = $1"),
        vec![id.into()],
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| Target::Employee.not_found())
}

pub async fn in_department<C: ConnectionTrait>(
    conn: &C,
    department_id: i32,
) -> ApiResult<Vec<EmployeeRow>> {
    fetch(
        conn,
        format!("{EMPLOYEE_SELECT} WHERE e.department_id = $1 ORDER BY e.last_name, e.first_name"),
        vec![department_id.into()],
    )
    .await
}

pub async fn holding_job<C: ConnectionTrait>(
    conn: &C,
    job_id: &str,
) -> ApiResult<Vec<EmployeeRow>> {
    fetch(
        conn,
        format!("{EMPLOYEE_SELECT} WHERE e.job_id = $1 ORDER BY e.last_name, e.first_name"),
        vec![validate::job_key(job_id).into()],
    )
    .await
}

pub async fn stats<C: ConnectionTrait>(conn: &C) -> ApiResult<EmployeeStats> {
    let backend = conn.get_database_backend();
    let department_stats = DepartmentHeadcount::find_by_statement(Statement::from_string(
        backend,
        "SELECT d.department_name, COUNT(e.employee_id) AS employee_count, \
         AVG(e.salary) AS average_salary, MIN(e.salary) AS min_salary, \
         MAX(e.salary) AS max_salary, SUM(e.salary) AS total_salary \
         FROM departments d LEFT JOIN employees e ON d.department_id = e.department_id \
         GROUP BY d.department_id, d.department_name \
         ORDER BY employee_count DESC, d.department_name",
    ))
    .all(conn)
    .await
    .map_err(read_failed)?;

    let job_stats = JobHeadcount::find_by_statement(Statement::from_string(
        backend,
        "SELECT j.job_title, COUNT(e.employee_id) AS employee_count, \
         AVG(e.salary) AS average_salary, MIN(e.salary) AS min_salary, \
         MAX(e.salary) AS max_salary \
         FROM jobs j LEFT JOIN employees e ON j.job_id = e.job_id \
         GROUP BY j.job_id, j.job_title \
         ORDER BY employee_count DESC, j.job_title",
    ))
    .all(conn)
    .await
    .map_err(read_failed)?;

    let overall_stats = WorkforceSummary::find_by_statement(Statement::from_string(
        backend,
        "SELECT COUNT(*) AS total_employees, AVG(salary) AS overall_average_salary, \
         MIN(salary) AS overall_min_salary, MAX(salary) AS overall_max_salary, \
         SUM(salary) AS total_payroll, \
         COUNT(CASE WHEN manager_id IS NULL THEN 1 END) AS top_level_managers, \
         COUNT(CASE WHEN commission_pct IS NOT NULL THEN 1 END) AS employees_with_commission \
         FROM employees",
    ))
    .one(conn)
    .await
    .map_err(read_failed)?
    .ok_or_else(|| ApiError::internal(anyhow::anyhow!("workforce summary returned no row")))?;

    Ok(EmployeeStats {
        department_stats,
        job_stats,
        overall_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn input(email: &str) -> EmployeeInput {
        EmployeeInput {
            first_name: Some("Valli".into()),
            last_name: Some("Pataballa".into()),
            email: Some(email.into()),
            phone_number: Some("590.423.4560".into()),
            hire_date: NaiveDate::from_ymd_opt(2006, 2, 5),
            job_id: Some("IT_PROG".into()),
            salary: Some(4800.0),
            commission_pct: None,
            manager_id: None,
            department_id: Some(60),
        }
    }

    #[tokio::test]
    async fn created_employee_reads_back_unchanged() {
        let db = testing::database().await;
        create(&db, &input("VPATABAL")).await.unwrap();

        let rows = search(&db, "vpatabal").await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = get(&db, rows[0].employee_id).await.unwrap();
        assert_eq!(row.first_name, "Valli");
        assert_eq!(row.phone_number.as_deref(), Some("590.423.4560"));
        assert_eq!(row.hire_date, NaiveDate::from_ymd_opt(2006, 2, 5).unwrap());
        assert_eq!(row.salary, Some(4800.0));
        assert_eq!(row.job_title.as_deref(), Some("Programmer"));
        assert_eq!(row.department_name.as_deref(), Some("IT"));
    }

    #[tokio::test]
    async fn unknown_manager_is_rejected_before_insert() {
        let db = testing::database().await;
        let err = create(
            &db,
            &EmployeeInput {
                manager_id: Some(4040),
                ..input("NOBODY")
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("managerId"));
        assert_eq!(employees::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_clears_omitted_optionals_and_keeps_hire_date() {
        let db = testing::database().await;
        create(&db, &input("DAUSTIN")).await.unwrap();
        let id = search(&db, "daustin").await.unwrap()[0].employee_id;

        let replacement = EmployeeInput {
            phone_number: None,
            department_id: None,
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..input("DAUSTIN")
        };
        update(&db, id, &replacement).await.unwrap();
        update(&db, id, &replacement).await.unwrap();

        let row = get(&db, id).await.unwrap();
        assert_eq!(row.phone_number, None);
        assert_eq!(row.department_id, None);
        assert_eq!(row.hire_date, NaiveDate::from_ymd_opt(2006, 2, 5).unwrap());
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let db = testing::database().await;
        assert_eq!(
            update(&db, 999, &input("GHOST")).await.unwrap_err(),
            ApiError::NotFound("Employee not found".into())
        );
        assert_eq!(
            delete(&db, 999).await.unwrap_err(),
            ApiError::NotFound("Employee not found".into())
        );
        assert!(matches!(get(&db, 999).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn hire_enforces_the_job_salary_range() {
        let db = testing::database().await;
        let err = hire(
            &db,
            &EmployeeInput {
                salary: Some(99_000.0),
                ..input("RICH")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRule(_)));

        let err = hire(
            &db,
            &EmployeeInput {
                job_id: Some("NO_SUCH".into()),
                ..input("LOST")
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid job ID specified: NO_SUCH");

        hire(&db, &input("NSARCHAN")).await.unwrap();
        assert_eq!(employees::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn pages_report_totals() {
        let db = testing::database().await;
        for email in ["A1", "A2", "A3"] {
            create(&db, &input(email)).await.unwrap();
        }
        let listing = list(&db, PageRequest::new(Some(2), Some(2))).await.unwrap();
        match listing {
            Listing::Page { data, pagination } => {
                assert_eq!(data.len(), 1);
                assert_eq!(pagination, Pagination::new(2, 2, 3));
                assert_eq!(pagination.total_pages, 2);
            }
            Listing::All { .. } => panic!("expected a page"),
        }
        assert_eq!(list(&db, PageRequest::default()).await.unwrap().data().len(), 3);
    }

    #[tokio::test]
    async fn stats_cover_departments_jobs_and_totals() {
        let db = testing::database().await;
        create(&db, &input("S1")).await.unwrap();
        create(
            &db,
            &EmployeeInput {
                salary: Some(5200.0),
                commission_pct: Some(0.2),
                ..input("S2")
            },
        )
        .await
        .unwrap();

        let stats = stats(&db).await.unwrap();
        assert_eq!(stats.overall_stats.total_employees, 2);
        assert_eq!(stats.overall_stats.total_payroll, Some(10_000.0));
        assert_eq!(stats.overall_stats.employees_with_commission, 1);
        assert_eq!(stats.department_stats[0].department_name, "IT");
        assert_eq!(stats.department_stats[0].average_salary, Some(5000.0));
        assert_eq!(stats.job_stats.len(), 2);
    }

    #[tokio::test]
    async fn blank_search_is_a_validation_error() {
        let db = testing::database().await;
        assert_eq!(search(&db, "  ").await.unwrap_err().field(), Some("q"));
    }
}
