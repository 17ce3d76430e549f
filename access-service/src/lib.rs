pub mod config;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{Application, RunReport};
