use entity::departments;
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, Statement,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    dispatch::{self, Action, Target},
    input::{DepartmentInput, DepartmentRecord},
    read_failed,
    references::{self, Guarded, Reference},
    validate,
};

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRow {
    pub department_id: i32,
    pub department_name: String,
    pub manager_id: Option<i32>,
    pub manager_name: Option<String>,
    pub location: Option<String>,
    pub employee_count: i64,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDetail {
    pub department_id: i32,
    pub department_name: String,
    pub manager_id: Option<i32>,
    pub manager_name: Option<String>,
    pub location_id: Option<i32>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStatsRow {
    pub department_id: i32,
    pub department_name: String,
    pub employee_count: i64,
    pub average_salary: Option<f64>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub total_salary_cost: Option<f64>,
    /// Employees in the department without a manager of their own.
    pub managers_count: i64,
    pub manager_name: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub total_departments: i64,
    pub total_employees: i64,
    pub overall_average_salary: Option<f64>,
    pub total_payroll: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepartmentStats {
    pub data: Vec<DepartmentStatsRow>,
    pub summary: DepartmentSummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreated {
    pub department_name: String,
}

fn references(record: &DepartmentRecord) -> Vec<Reference<'static>> {
    record
        .manager_id
        .map(Reference::Manager)
        .into_iter()
        .chain(record.location_id.map(Reference::Location))
        .collect()
}

fn columns(record: &DepartmentRecord) -> departments::ActiveModel {
    departments::ActiveModel {
        department_id: NotSet,
        department_name: Set(record.department_name.clone()),
        manager_id: Set(record.manager_id),
        location_id: Set(record.location_id),
    }
}

#[instrument(name = "hr.departments.create", skip_all)]
pub async fn create<C: ConnectionTrait>(
    conn: &C,
    input: &DepartmentInput,
) -> ApiResult<DepartmentCreated> {
    let record = validate::department(input)?;
    references::ensure_exist(conn, &references(&record)).await?;
    dispatch::write(
        conn,
        Target::Department,
        Action::Create,
        departments::Entity::insert(columns(&record)),
    )
    .await?;
    info!(name = %record.department_name, "department created");
    Ok(DepartmentCreated {
        department_name: record.department_name,
    })
}

#[instrument(name = "hr.departments.update", skip_all, fields(department_id = id))]
pub async fn update<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    input: &DepartmentInput,
) -> ApiResult<()> {
    let record = validate::department(input)?;
    references::ensure_exist(conn, &references(&record)).await?;
    let query = departments::Entity::update_many()
        .set(columns(&record))
        .filter(departments::Column::DepartmentId.eq(id));
    dispatch::write(conn, Target::Department, Action::Update, query).await?;
    info!("department updated");
    Ok(())
}

/// Refuses while any employee still belongs to the department.
#[instrument(name = "hr.departments.delete", skip_all, fields(department_id = id))]
pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> ApiResult<()> {
    references::ensure_unreferenced(conn, Guarded::Department(id)).await?;
    dispatch::write(
        conn,
        Target::Department,
        Action::Delete,
        departments::Entity::delete_by_id(id),
    )
    .await?;
    info!("department deleted");
    Ok(())
}

pub async fn list<C: ConnectionTrait>(conn: &C) -> ApiResult<Vec<DepartmentRow>> {
    let stmt = Statement::from_string(
        conn.get_database_backend(),
        "SELECT d.department_id, d.department_name, d.manager_id, \
         m.first_name || ' ' || m.last_name AS manager_name, \
         l.street_address || ', ' || l.city || ', ' || l.state_province AS location, \
         COUNT(e.employee_id) AS employee_count \
         FROM departments d \
         LEFT JOIN employees m ON d.manager_id = m.employee_id \
         LEFT JOIN locations l ON d.location_id = l.location_id \
         LEFT JOIN employees e ON d.department_id = e.department_id \
         GROUP BY d.department_id, d.department_name, d.manager_id, \
                  m.first_name, m.last_name, l.street_address, l.city, l.state_province \
         ORDER BY d.department_name",
    );
    DepartmentRow::find_by_statement(stmt)
        .all(conn)
        .await
        .map_err(read_failed)
}

pub async fn get<C: ConnectionTrait>(conn: &C, id: i32) -> ApiResult<DepartmentDetail> {
    let stmt = Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT d.department_id, d.department_name, d.manager_id, \
         m.first_name || ' ' || m.last_name AS manager_name, \
         d.location_id, l.street_address, l.city, l.state_province, l.postal_code, \
         c.country_name \
         FROM departments d \
         LEFT JOIN employees m ON d.manager_id = m.employee_id \
         LEFT JOIN locations l ON d.location_id = l.location_id \
         LEFT JOIN countries c ON l.country_id = c.country_id \
         WHERE d.department_id = $1",
        [id.into()],
    );
    DepartmentDetail::find_by_statement(stmt)
        .one(conn)
        .await
        .map_err(read_failed)?
        .ok_or_else(|| Target::Department.not_found())
}

pub async fn stats<C: ConnectionTrait>(conn: &C) -> ApiResult<DepartmentStats> {
    let backend = conn.get_database_backend();
    let data = DepartmentStatsRow::find_by_statement(Statement::from_string(
        backend,
        "SELECT d.department_id, d.department_name, \
         COUNT(e.employee_id) AS employee_count, \
         AVG(e.salary) AS average_salary, MIN(e.salary) AS min_salary, \
         MAX(e.salary) AS max_salary, SUM(e.salary) AS total_salary_cost, \
         COUNT(CASE WHEN e.employee_id IS NOT NULL AND e.manager_id IS NULL THEN 1 END) AS managers_count, \
         m.first_name || ' ' || m.last_name AS manager_name, \
         l.city || ', ' || l.state_province AS location \
         FROM departments d \
         LEFT JOIN employees e ON d.department_id = e.department_id \
         LEFT JOIN employees m ON d.manager_id = m.employee_id \
         LEFT JOIN locations l ON d.location_id = l.location_id \
         GROUP BY d.department_id, d.department_name, d.manager_id, \
                  m.first_name, m.last_name, l.city, l.state_province \
         ORDER BY employee_count DESC, d.department_name",
    ))
    .all(conn)
    .await
    .map_err(read_failed)?;

    let summary = DepartmentSummary::find_by_statement(Statement::from_string(
        backend,
        "SELECT COUNT(DISTINCT d.department_id) AS total_departments, \
         COUNT(e.employee_id) AS total_employees, \
         AVG(e.salary) AS overall_average_salary, SUM(e.salary) AS total_payroll \
         FROM departments d LEFT JOIN employees e ON d.department_id = e.department_id",
    ))
    .one(conn)
    .await
    .map_err(read_failed)?
    .ok_or_else(|| ApiError::internal(anyhow::anyhow!("department summary returned no row")))?;

    Ok(DepartmentStats { data, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{employees, input::EmployeeInput, testing};

    fn named(name: &str) -> DepartmentInput {
        DepartmentInput {
            department_name: Some(name.into()),
            manager_id: None,
            location_id: Some(1700),
        }
    }

    async fn id_of<C: ConnectionTrait>(conn: &C, name: &str) -> i32 {
        list(conn)
            .await
            .unwrap()
            .into_iter()
            .find(|row| row.department_name == name)
            .map(|row| row.department_id)
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_read_detail() {
        let db = testing::database().await;
        create(&db, &named("Shipping")).await.unwrap();
        let id = id_of(&db, "Shipping").await;
        let detail = get(&db, id).await.unwrap();
        assert_eq!(detail.city.as_deref(), Some("Seattle"));
        assert_eq!(detail.country_name.as_deref(), Some("United States of America"));
    }

    #[tokio::test]
    async fn thirty_one_character_name_writes_nothing() {
        let db = testing::database().await;
        let err = create(&db, &named(&"x".repeat(31))).await.unwrap_err();
        assert_eq!(err.field(), Some("departmentName"));
        assert_eq!(list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_location_is_a_reference_error() {
        let db = testing::database().await;
        let input = DepartmentInput {
            location_id: Some(9),
            ..named("Treasury")
        };
        let err = create(&db, &input).await.unwrap_err();
        assert_eq!(err.field(), Some("locationId"));
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let db = testing::database().await;
        let err = create(&db, &named("IT")).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Conflict("Department with this name already exists".into())
        );
    }

    #[tokio::test]
    async fn staffed_department_survives_delete() {
        let db = testing::database().await;
        employees::create(
            &db,
            &EmployeeInput {
                first_name: Some("David".into()),
                last_name: Some("Austin".into()),
                email: Some("DAUSTIN".into()),
                job_id: Some("IT_PROG".into()),
                department_id: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = delete(&db, 60).await.unwrap_err();
        assert!(matches!(err, ApiError::InUse(_)));
        assert!(get(&db, 60).await.is_ok());

        assert_eq!(
            delete(&db, 4242).await.unwrap_err(),
            ApiError::NotFound("Department not found".into())
        );
    }

    #[tokio::test]
    async fn stats_count_staff_per_department() {
        let db = testing::database().await;
        create(&db, &named("Empty")).await.unwrap();
        let stats = stats(&db).await.unwrap();
        assert_eq!(stats.summary.total_departments, 2);
        assert_eq!(stats.summary.total_employees, 0);
        assert!(stats.data.iter().all(|row| row.employee_count == 0));
        assert_eq!(stats.data[0].location.as_deref(), Some("Seattle, Washington"));
    }
}
