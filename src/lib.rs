pub mod config;
pub mod controller;
pub mod helpers;
pub mod mailer;
pub mod models;
pub mod repositories;
