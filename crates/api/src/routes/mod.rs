pub mod attendance;
pub mod classes;
pub mod health;
pub mod refresh;
pub mod reports;
pub mod students;
