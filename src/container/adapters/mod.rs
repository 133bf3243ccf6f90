//! Adapter implementations for container orchestration ports.

pub mod memory;

mod agent;
mod http;
mod templates;

pub use agent::{AgentCall, InMemoryAgent, STARTED, STOPPED};
pub use http::HttpAgentClient;
pub use templates::DirTemplateSource;
