//! HTTP API: server, routing, and the REST-to-GraphQL gateway.

pub mod app;
