//! HTTP handlers and routing.

pub mod messages;
pub mod routes;
pub mod tasks;
pub mod users;

pub(crate) mod monitoring;
