pub mod admin;
pub mod health;
pub mod jobs;
pub mod projects;
pub mod secrets;
pub mod tokens;
pub mod webhooks;
