//! Field-level checks run before any database access.
//!
//! Rules are evaluated in a fixed order and the first failure is returned:
//! presence, then length, then numeric range, then cross-field rules.

use platform_api::{ApiError, ApiResult};

use crate::input::{
    DepartmentInput, DepartmentRecord, EmployeeInput, EmployeeRecord, JobInfo, JobInput,
    JobRecord, present,
};

pub const FIRST_NAME_MAX: usize = 20;
pub const LAST_NAME_MAX: usize = 25;
pub const EMAIL_MAX: usize = 25;
pub const PHONE_MAX: usize = 20;
pub const JOB_ID_MAX: usize = 10;
pub const JOB_TITLE_MAX: usize = 35;
pub const DEPARTMENT_NAME_MAX: usize = 30;

pub const SALARY_MAX: f64 = 999_999.99;
pub const COMMISSION_MAX: f64 = 0.99;
pub const JOB_SALARY_MAX: f64 = 999_999.0;

fn required<'a>(field: &'static str, label: &str, value: &'a Option<String>) -> ApiResult<&'a str> {
    present(value).ok_or_else(|| ApiError::validation(field, format!("{label} is required")))
}

fn max_len(field: &'static str, label: &str, value: Option<&str>, max: usize) -> ApiResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(ApiError::validation(
            field,
            format!("{label} cannot exceed {max} characters"),
        )),
        _ => Ok(()),
    }
}

fn in_range(field: &'static str, message: &str, value: Option<f64>, max: f64) -> ApiResult<()> {
    match value {
        Some(value) if !(0.0..=max).contains(&value) => {
            Err(ApiError::validation(field, message.to_string()))
        }
        _ => Ok(()),
    }
}

/// Job ids are stored upper-cased; every path or payload id goes through here.
pub fn job_key(id: &str) -> String {
    id.trim().to_uppercase()
}

pub fn employee(input: &EmployeeInput) -> ApiResult<EmployeeRecord> {
    let first_name = required("firstName", "First name", &input.first_name)?;
    let last_name = required("lastName", "Last name", &input.last_name)?;
    let email = required("email", "Email", &input.email)?;
    let job_id = required("jobId", "Job ID", &input.job_id)?;
    let phone_number = present(&input.phone_number);

    max_len("firstName", "First name", Some(first_name), FIRST_NAME_MAX)?;
    max_len("lastName", "Last name", Some(last_name), LAST_NAME_MAX)?;
    max_len("email", "Email", Some(email), EMAIL_MAX)?;
    max_len("phoneNumber", "Phone number", phone_number, PHONE_MAX)?;
    max_len("jobId", "Job ID", Some(job_id), JOB_ID_MAX)?;

    in_range(
        "salary",
        "Salary must be between 0 and 999,999.99",
        input.salary,
        SALARY_MAX,
    )?;
    in_range(
        "commissionPct",
        "Commission percentage must be between 0.00 and 0.99",
        input.commission_pct,
        COMMISSION_MAX,
    )?;

    Ok(EmployeeRecord {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone_number: phone_number.map(str::to_string),
        hire_date: input.hire_date,
        job_id: job_key(job_id),
        salary: input.salary,
        commission_pct: input.commission_pct,
        manager_id: input.manager_id,
        department_id: input.department_id,
    })
}

pub fn department(input: &DepartmentInput) -> ApiResult<DepartmentRecord> {
    let name = required("departmentName", "Department name", &input.department_name)?;
    max_len("departmentName", "Department name", Some(name), DEPARTMENT_NAME_MAX)?;
    Ok(DepartmentRecord {
        department_name: name.to_string(),
        manager_id: input.manager_id,
        location_id: input.location_id,
    })
}

/// Validate a job for creation; the id comes from the payload.
pub fn job(input: &JobInput) -> ApiResult<JobRecord> {
    let job_id = required("jobId", "Job ID", &input.job_id)?;
    required("jobTitle", "Job title", &input.job_title)?;
    max_len("jobId", "Job ID", Some(job_id), JOB_ID_MAX)?;
    let info = job_info(input)?;
    Ok(JobRecord {
        job_id: job_key(job_id),
        job_title: info.job_title,
        min_salary: info.min_salary,
        max_salary: info.max_salary,
    })
}

/// Validate the mutable part of a job; any `job_id` in the payload is ignored.
pub fn job_info(input: &JobInput) -> ApiResult<JobInfo> {
    let title = required("jobTitle", "Job title", &input.job_title)?;
    max_len("jobTitle", "Job title", Some(title), JOB_TITLE_MAX)?;
    in_range(
        "minSalary",
        "Minimum salary must be between 0 and 999,999",
        input.min_salary,
        JOB_SALARY_MAX,
    )?;
    in_range(
        "maxSalary",
        "Maximum salary must be between 0 and 999,999",
        input.max_salary,
        JOB_SALARY_MAX,
    )?;
    if let (Some(min), Some(max)) = (input.min_salary, input.max_salary) {
        if min > max {
            return Err(ApiError::validation(
                "minSalary",
                "Minimum salary cannot be greater than maximum salary",
            ));
        }
    }
    Ok(JobInfo {
        job_title: title.to_string(),
        min_salary: input.min_salary,
        max_salary: input.max_salary,
    })
}
