//! Container manager: lifecycle control for application-server containers
//! hosted by remote agents.
//!
//! Each agent exposes an HTTP API whose mutating calls return asynchronous
//! tasks. The crate turns lifecycle intents into those calls, polls the
//! resulting tasks to completion, and keeps a registry of containers, their
//! owning agents, and their last observed state.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Container records, names, states, and descriptors
//! - **Ports**: Agent API, registries, catalog, and template source traits
//! - **Adapters**: HTTP agent client plus in-memory implementations
//!
//! # Modules
//!
//! - [`config`]: YAML settings
//! - [`container`]: Container lifecycle orchestration
//! - [`telemetry`]: `tracing` subscriber initialization

pub mod config;
pub mod container;
pub mod telemetry;
