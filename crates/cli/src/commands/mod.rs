pub mod policy;
pub mod queries;
