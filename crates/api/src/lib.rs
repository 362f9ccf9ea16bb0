//! HTTP surface of the gate: server wiring, middleware and upstream forwarding.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod proxy;
