pub mod access;
pub mod assignments;
pub mod catalog;
pub mod health;
pub mod roles;
pub mod seeding;
