#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;

pub mod authentication;
pub mod catchers;
pub mod configuration;
pub mod domain;
pub mod email;
pub mod guards;
pub mod models;
pub mod port_saver;
pub mod reminders;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod telemetry;
