//! Persistence layer for the attendance tracker.
//!
//! This crate contains:
//! - Store configuration and one-time backend selection
//! - The record store contract and its two implementations (remote, local)
//! - Remote row mappings and the realtime change feed
//! - Reactive collection gateways consumed by the host application

pub mod config;
pub mod entities;
pub mod error;
pub mod gateway;
pub mod local;
pub mod metrics;
pub mod notify;
pub mod record;
pub mod remote;
pub mod store;

pub use config::{BackendKind, StoreConfig};
pub use error::StoreError;
pub use gateway::{AttendanceGateway, CollectionGateway, PersistenceGateway, Snapshot, UpsertOutcome};
pub use record::{Record, RecordKind};
pub use store::{AttendanceStore, RecordStore, Stores};
