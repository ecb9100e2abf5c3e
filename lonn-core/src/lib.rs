pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{RepositoryError, SalaryRepository};
pub use models::*;
