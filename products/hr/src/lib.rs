//! HR records core.
//!
//! Every write goes through the same pipeline: [`validate`] turns a raw
//! payload into a record, [`references`] confirms that the foreign keys it
//! names exist, and [`dispatch`] runs the statement (or a stored routine from
//! [`routines`]) and translates vendor failures into [`platform_api::ApiError`].
//!
//! All functions are generic over [`sea_orm::ConnectionTrait`], so a caller
//! can run a whole pipeline on the pool or inside one transaction.

pub mod departments;
pub mod dispatch;
pub mod employees;
pub mod input;
pub mod jobs;
pub mod references;
pub mod routines;
pub mod seed;
pub mod validate;

pub use dispatch::{Action, Target};
pub use input::{DepartmentInput, EmployeeInput, JobInput};

use platform_api::{ApiError, ApiResult};
use sea_orm::DbErr;
use serde::Serialize;

/// Read failures never carry client-facing meaning.
pub(crate) fn read_failed(err: DbErr) -> ApiError {
    ApiError::internal(err)
}

/// Largest page a client may ask for.
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Page request. Only honoured when both values are positive.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A resolved page: what the client asked for plus the SQL offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page, limit }
    }

    /// `None` when paging does not apply. A limit above [`MAX_PAGE_LIMIT`] or
    /// a page whose offset does not fit a SQL bigint is rejected.
    pub fn window(&self) -> ApiResult<Option<PageWindow>> {
        let (page, limit) = match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => (page, limit),
            _ => return Ok(None),
        };
        if limit > MAX_PAGE_LIMIT {
            return Err(ApiError::validation(
                "limit",
                format!("Limit cannot exceed {MAX_PAGE_LIMIT}"),
            ));
        }
        let offset = (page - 1)
            .checked_mul(limit)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(|| ApiError::validation("page", "Page is out of range"))?;
        Ok(Some(PageWindow {
            page,
            limit,
            offset,
        }))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

/// A list response, either whole or one page of it.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All { data: Vec<T>, total: u64 },
    Page { data: Vec<T>, pagination: Pagination },
}

impl<T> Listing<T> {
    pub fn all(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self::All { data, total }
    }

    pub fn data(&self) -> &[T] {
        match self {
            Listing::All { data, .. } | Listing::Page { data, .. } => data,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

    /// Fresh migrated in-memory database. One connection, since every
    /// in-memory connection is its own database.
    pub async fn migrated() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    /// [`migrated`] plus two jobs, a location and a department.
    pub async fn database() -> DatabaseConnection {
        let db = migrated().await;
        db.execute_unprepared(
            "INSERT INTO countries (country_id, country_name, region_name) VALUES ('US', 'United States of America', 'Americas');
             INSERT INTO locations (location_id, street_address, postal_code, city, state_province, country_id)
                 VALUES (1700, '2004 Charade Rd', '98199', 'Seattle', 'Washington', 'US');
             INSERT INTO jobs (job_id, job_title, min_salary, max_salary) VALUES ('IT_PROG', 'Programmer', 4000.0, 10000.0);
             INSERT INTO jobs (job_id, job_title, min_salary, max_salary) VALUES ('AD_PRES', 'President', 20000.0, 40000.0);
             INSERT INTO departments (department_id, department_name, location_id) VALUES (60, 'IT', 1700);",
        )
        .await
        .unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_needs_both_values() {
        assert_eq!(
            PageRequest::new(Some(2), Some(10)).window(),
            Ok(Some(PageWindow {
                page: 2,
                limit: 10,
                offset: 10
            }))
        );
        assert_eq!(PageRequest::new(Some(2), None).window(), Ok(None));
        assert_eq!(PageRequest::new(Some(0), Some(10)).window(), Ok(None));
    }

    #[test]
    fn extreme_pages_are_rejected_not_wrapped() {
        let err = PageRequest::new(Some(u64::MAX), Some(2)).window().unwrap_err();
        assert_eq!(err.field(), Some("page"));
        let err = PageRequest::new(Some(1), Some(u64::MAX)).window().unwrap_err();
        assert_eq!(err.field(), Some("limit"));
        let last = PageRequest::new(Some(i64::MAX as u64 / 1000 + 1), Some(1000)).window();
        assert!(last.is_ok());
    }

    #[test]
    fn total_pages_round_up() {
        assert_eq!(Pagination::new(1, 10, 21).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }
}
