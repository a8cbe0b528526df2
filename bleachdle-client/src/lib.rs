pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod transition;
