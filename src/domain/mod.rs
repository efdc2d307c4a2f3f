pub mod change;
pub mod filter;
pub mod interval;
pub mod job_record;
