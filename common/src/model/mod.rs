pub mod ingestion;
pub mod schema;
pub mod site;
pub mod validation;
