//! sea-orm models for the HR schema.
//!
//! `countries` and `locations` are reference data and are only ever read.
//! `jobs`, `departments` and `employees` are written by `products-hr`.

pub mod countries;
pub mod departments;
pub mod employees;
pub mod jobs;
pub mod locations;
