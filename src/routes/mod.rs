pub mod dashboard;
pub mod health;
pub mod reports;
pub mod results;
pub mod users;
