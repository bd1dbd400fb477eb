//! Existence pre-checks for foreign keys supplied by a caller, and the guard
//! that refuses to delete departments or jobs still held by employees.
//!
//! These checks are best effort. Another request can delete a referenced row
//! between the check and the mutation; the store's own foreign keys remain the
//! final authority and their violations are translated by [`crate::dispatch`].
//! Running the pipeline on a transaction closes that window.

use entity::{departments, employees, jobs, locations};
use platform_api::{ApiError, ApiResult};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::debug;

/// A foreign key named in an incoming payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference<'a> {
    Job(&'a str),
    Manager(i32),
    Department(i32),
    Location(i32),
}

impl Reference<'_> {
    pub fn field(&self) -> &'static str {
        match self {
            Reference::Job(_) => "jobId",
            Reference::Manager(_) => "managerId",
            Reference::Department(_) => "departmentId",
            Reference::Location(_) => "locationId",
        }
    }

    fn missing(&self) -> ApiError {
        let message = match self {
            Reference::Job(_) => "Invalid job ID - job not found",
            Reference::Manager(_) => "Invalid manager ID - employee not found",
            Reference::Department(_) => "Invalid department ID - department not found",
            Reference::Location(_) => "Invalid location ID - location not found",
        };
        ApiError::reference(self.field(), message)
    }

    async fn count<C: ConnectionTrait>(&self, conn: &C) -> Result<u64, DbErr> {
        match *self {
            Reference::Job(id) => jobs::Entity::find_by_id(id.to_string()).count(conn).await,
            Reference::Manager(id) => employees::Entity::find_by_id(id).count(conn).await,
            Reference::Department(id) => departments::Entity::find_by_id(id).count(conn).await,
            Reference::Location(id) => locations::Entity::find_by_id(id).count(conn).await,
        }
    }
}

/// Check each reference in order and stop at the first one that is missing.
pub async fn ensure_exist<C: ConnectionTrait>(
    conn: &C,
    references: &[Reference<'_>],
) -> ApiResult<()> {
    for reference in references {
        let found = reference.count(conn).await.map_err(ApiError::internal)?;
        if found == 0 {
            debug!(field = reference.field(), "reference pre-check failed");
            return Err(reference.missing());
        }
    }
    Ok(())
}

/// Rows that cannot be deleted while employees point at them.
#[derive(Clone, Copy, Debug)]
pub enum Guarded<'a> {
    Department(i32),
    Job(&'a str),
}

/// Count the employees still referencing `target`; refuse when there are any.
pub async fn ensure_unreferenced<C: ConnectionTrait>(
    conn: &C,
    target: Guarded<'_>,
) -> ApiResult<()> {
    let (filter, message) = match target {
        Guarded::Department(id) => (
            employees::Column::DepartmentId.eq(id),
            "Cannot delete department with active employees",
        ),
        Guarded::Job(id) => (
            employees::Column::JobId.eq(id),
            "Cannot delete job with active employees",
        ),
    };
    let holders = employees::Entity::find()
        .filter(filter)
        .count(conn)
        .await
        .map_err(ApiError::internal)?;
    if holders > 0 {
        return Err(ApiError::InUse(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn existing_references_pass() {
        let db = testing::database().await;
        ensure_exist(
            &db,
            &[
                Reference::Job("IT_PROG"),
                Reference::Department(60),
                Reference::Location(1700),
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn first_missing_reference_is_reported() {
        let db = testing::database().await;
        let err = ensure_exist(
            &db,
            &[
                Reference::Job("IT_PROG"),
                Reference::Manager(999),
                Reference::Department(12345),
            ],
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("managerId"));
        assert_eq!(err.to_string(), "Invalid manager ID - employee not found");
    }

    #[tokio::test]
    async fn guard_blocks_departments_with_employees() {
        let db = testing::database().await;
        ensure_unreferenced(&db, Guarded::Department(60)).await.unwrap();

        db.execute_unprepared(
            "INSERT INTO employees (first_name, last_name, email, hire_date, job_id, department_id)
             VALUES ('Alexander', 'Hunold', 'AHUNOLD', '2006-01-03', 'IT_PROG', 60)",
        )
        .await
        .unwrap();

        let err = ensure_unreferenced(&db, Guarded::Department(60)).await.unwrap_err();
        assert!(matches!(err, ApiError::InUse(_)));
        let err = ensure_unreferenced(&db, Guarded::Job("IT_PROG")).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete job with active employees");
        ensure_unreferenced(&db, Guarded::Job("AD_PRES")).await.unwrap();
    }
}
