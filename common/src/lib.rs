//! Models shared between the site upload backend and its clients.
//!
//! Nothing in this crate performs I/O: it holds the static site schema, the
//! row and record shapes that flow through the ingestion pipeline, and the
//! request/response payloads of the HTTP API.

pub mod jobs;
pub mod model;
pub mod requests;
