pub mod drink_repo;
pub mod error;
