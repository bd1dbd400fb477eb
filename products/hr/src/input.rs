//! Request payloads as they arrive, and the validated records built from them.
//!
//! Payloads keep every field optional so that validation, not deserialization,
//! decides what is missing. Blank strings count as absent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub job_id: Option<String>,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub manager_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    pub department_name: Option<String>,
    pub manager_id: Option<i32>,
    pub location_id: Option<i32>,
}

/// Job payload. `job_id` is only read on create; updates take it from the path.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub job_id: String,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub manager_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentRecord {
    pub department_name: String,
    pub manager_id: Option<i32>,
    pub location_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobRecord {
    pub job_id: String,
    pub job_title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

/// The mutable part of a job: everything except its id.
#[derive(Clone, Debug, PartialEq)]
pub struct JobInfo {
    pub job_title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
