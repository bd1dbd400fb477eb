//! Mutation dispatch: run a write and turn whatever the store says into the
//! client-facing taxonomy.
//!
//! Vendor codes are never inspected here; [`platform_db::classify`] maps them
//! to a [`VendorErrorKind`] and this module decides what each kind means for
//! the entity being written.

use platform_api::{ApiError, ApiResult};
use platform_db::{VendorErrorKind, classify};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, QueryTrait};
use tracing::{debug, error};

use crate::routines::Routine;

/// The entity a mutation writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Employee,
    Department,
    Job,
}

impl Target {
    pub fn noun(&self) -> &'static str {
        match self {
            Target::Employee => "Employee",
            Target::Department => "Department",
            Target::Job => "Job",
        }
    }

    pub fn not_found(&self) -> ApiError {
        ApiError::NotFound(format!("{} not found", self.noun()))
    }

    fn conflict(&self) -> &'static str {
        match self {
            Target::Employee => "Employee with this email already exists",
            Target::Department => "Department with this name already exists",
            Target::Job => "Job with this ID already exists",
        }
    }

    fn invalid_reference(&self) -> ApiError {
        match self {
            Target::Employee => ApiError::reference(
                "reference",
                "Invalid foreign key reference (job, manager, or department)",
            ),
            Target::Department => ApiError::reference(
                "reference",
                "Invalid foreign key reference (manager or location)",
            ),
            Target::Job => ApiError::reference("reference", "Invalid foreign key reference"),
        }
    }

    fn still_referenced(&self) -> ApiError {
        let message = match self {
            Target::Employee => {
                "Cannot delete employee who manages other employees or departments"
            }
            Target::Department => "Cannot delete department with active employees",
            Target::Job => "Cannot delete job with active employees",
        };
        ApiError::InUse(message.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Create => "created",
            Action::Update => "updated",
            Action::Delete => "deleted",
        }
    }

    /// Success message for a response body, e.g. "Job updated successfully".
    pub fn message(&self, target: Target) -> String {
        format!("{} {} successfully", target.noun(), self.verb())
    }
}

/// Map a failed write to the client taxonomy. Unclassified failures are
/// logged with full detail and masked.
pub fn translate(backend: DbBackend, target: Target, action: Action, err: DbErr) -> ApiError {
    let vendor = classify(&err, backend);
    debug!(
        entity = target.noun(),
        ?action,
        kind = ?vendor.kind,
        code = vendor.code.as_deref().unwrap_or("-"),
        "write rejected by store"
    );
    match vendor.kind {
        VendorErrorKind::UniqueViolation => ApiError::Conflict(target.conflict().to_string()),
        VendorErrorKind::ForeignKeyViolation if action == Action::Delete => {
            target.still_referenced()
        }
        VendorErrorKind::ForeignKeyViolation => target.invalid_reference(),
        VendorErrorKind::ValueTooLong => ApiError::validation(
            "body",
            "One or more field values exceed maximum length",
        ),
        VendorErrorKind::NumericOverflow => ApiError::validation(
            "body",
            "Numeric value is too large for the field precision",
        ),
        VendorErrorKind::CheckViolation => ApiError::validation(
            "body",
            "One or more field values are outside the allowed range",
        ),
        VendorErrorKind::BusinessRule => ApiError::BusinessRule(vendor.message),
        VendorErrorKind::NoData => target.not_found(),
        VendorErrorKind::Other => {
            error!(
                entity = target.noun(),
                ?action,
                code = vendor.code.as_deref().unwrap_or("-"),
                error = %err,
                "write failed"
            );
            ApiError::internal(err)
        }
    }
}

/// Execute a built insert/update/delete and return the affected row count.
/// Updates and deletes that touch nothing report the target as not found.
pub async fn write<C, Q>(conn: &C, target: Target, action: Action, query: Q) -> ApiResult<u64>
where
    C: ConnectionTrait,
    Q: QueryTrait,
{
    let backend = conn.get_database_backend();
    let result = conn
        .execute(query.build(backend))
        .await
        .map_err(|err| translate(backend, target, action, err))?;
    let affected = result.rows_affected();
    if affected == 0 && action != Action::Create {
        return Err(target.not_found());
    }
    Ok(affected)
}

/// Invoke a business-rule routine. Rules live in the store; their rejections
/// arrive as [`ApiError::BusinessRule`] with the routine's own message.
pub async fn call<C: ConnectionTrait>(conn: &C, routine: &Routine<'_>) -> ApiResult<u64> {
    let target = routine.target();
    let action = routine.action();
    let affected = routine
        .run(conn)
        .await
        .map_err(|err| translate(conn.get_database_backend(), target, action, err))?;
    if affected == 0 {
        return Err(routine.nothing_written());
    }
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use entity::{departments, employees, jobs};
    use sea_orm::{ActiveValue::Set, EntityTrait, NotSet};

    fn department(name: &str, location_id: Option<i32>) -> departments::ActiveModel {
        departments::ActiveModel {
            department_id: NotSet,
            department_name: Set(name.to_string()),
            manager_id: Set(None),
            location_id: Set(location_id),
        }
    }

    #[tokio::test]
    async fn duplicate_names_are_conflicts() {
        let db = testing::database().await;
        let insert = departments::Entity::insert(department("IT", None));
        let err = write(&db, Target::Department, Action::Create, insert)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Conflict("Department with this name already exists".into())
        );
    }

    #[tokio::test]
    async fn dangling_foreign_keys_are_reference_errors() {
        let db = testing::database().await;
        let insert = departments::Entity::insert(department("Payroll", Some(4242)));
        let err = write(&db, Target::Department, Action::Create, insert)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ReferenceNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid foreign key reference (manager or location)"
        );
    }

    #[tokio::test]
    async fn deleting_nothing_is_not_found() {
        let db = testing::database().await;
        let delete = jobs::Entity::delete_by_id("NOPE".to_string());
        let err = write(&db, Target::Job, Action::Delete, delete)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound("Job not found".into()));
    }

    #[tokio::test]
    async fn trigger_rejections_pass_their_message_through() {
        let db = testing::database().await;
        let insert = employees::Entity::insert(employees::ActiveModel {
            employee_id: NotSet,
            first_name: Set("Bruce".into()),
            last_name: Set("Ernst".into()),
            email: Set("BERNST".into()),
            phone_number: Set(None),
            hire_date: Set(chrono::NaiveDate::from_ymd_opt(2007, 5, 21).unwrap()),
            job_id: Set("IT_PROG".into()),
            salary: Set(Some(150.0)),
            commission_pct: Set(None),
            manager_id: Set(None),
            department_id: Set(Some(60)),
        });
        let err = write(&db, Target::Employee, Action::Create, insert)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::BusinessRule("Salary is out of range for the selected job position".into())
        );
    }

    #[test]
    fn success_messages_name_the_entity() {
        assert_eq!(
            Action::Update.message(Target::Job),
            "Job updated successfully"
        );
    }
}
