//! Backend of the site upload service.
//!
//! Uploaded CSV files of geospatial sites are parsed, validated against the
//! site schema, split into batches and written to SQLite by a background job
//! whose progress clients poll over HTTP.

pub mod config;
pub mod error;
pub mod job_controller;
pub mod pipeline;
pub mod services;
pub mod store;
