//! Tycho — bootstrap runtime for a cloud-hosted conversational agent.
//!
//! Resolves layered [`config::Settings`], wires three pluggable backend
//! services (session state, artifact storage, long-term memory), holds one
//! orchestrator agent, and exposes an async interaction API that streams
//! agent-produced events back to the caller. Initialization happens at most
//! once per process, lazily on first use or eagerly via
//! [`system::create_app`].
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use tycho::config::Settings;
//! use tycho::system::AiSystem;
//!
//! # async fn example() -> tycho::error::Result<()> {
//! let settings = Settings::builder().company_name("acme").build();
//! let system = AiSystem::new(settings);
//!
//! let mut events = system.run_agent_interaction("u1", "s1", "hello").await?;
//! while let Some(event) = events.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod prelude;
pub mod runner;
pub mod services;
pub mod system;

pub use error::{Result, TychoError};
pub use system::{create_app, AiSystem};
