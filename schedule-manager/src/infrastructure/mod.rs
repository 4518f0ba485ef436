pub mod kv_store;
pub mod row_source;
pub mod schedule_repo;
pub mod sheets_source;
