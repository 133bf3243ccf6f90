//! Container lifecycle orchestration over remote execution agents.
//!
//! Callers issue lifecycle intents (create, start, stop, remove, deploy,
//! connector and datasource changes). Each intent becomes one or more agent
//! API submissions whose asynchronous tasks are polled to completion, after
//! which the registry's cached container state is refreshed from the agent.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
