pub mod chat;
pub mod filters;
pub mod health;
pub mod reports;
