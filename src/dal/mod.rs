pub mod archive_db;

pub use archive_db::*;
