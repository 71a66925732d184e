//! Storefront - Event-driven users/orders backend.
//!
//! Write commands arrive over HTTP, domain changes and their events commit
//! together through a transactional outbox, and a background drainer moves
//! outbox rows onto a Kafka-protocol bus. The peer domain consumes events
//! idempotently; a periodic scanner expires overdue orders.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
