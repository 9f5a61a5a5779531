pub mod attendance;
pub mod catalog;
pub mod employees;
pub mod orders;
pub mod reports;
