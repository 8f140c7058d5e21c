//! # Chatling Core Library
//!
//! Host-agnostic engine for a group chat's shared virtual pet.
//!
//! Every chat raises one [`Pet`] whose life is shaped by what the room
//! does:
//!
//! - **Vitals** — hunger, mood, energy and health, decaying on a timer
//! - **Care** — feeding, playing and the occasional food gamble
//! - **Growth** — experience, levels and stage evolution up to ancient
//! - **Character** — the chat's own tone locks in a pet type at adolescence
//! - **Night** — a sleep window where disturbing the pet has a price
//! - **World** — random events that strike while the pet is awake
//! - **Ledger** — per-user karma and counters, plus an audit trail
//!
//! ## Concurrency Contract
//!
//! One [`PetEngine`] serves every chat in the process:
//! - Commands and scheduled passes serialize per chat, never globally
//! - Storage sits behind [`PetRepository`], with SQLite and in-memory impls
//! - Scheduled passes fan chats out over a bounded worker pool
//! - Notifications are best-effort and never roll back committed state

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod evolution;
pub mod notify;
pub mod repo;
pub mod rng;
pub mod scheduler;
pub mod stats;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ActionOutcome, Disturbance, MessagePayload, PetEngine, Rejection};
pub use error::{EngineError, Result};
pub use notify::{ChannelNotifier, Notification, Notifier, NullNotifier};
pub use repo::{MemoryRepository, PetRepository, SqliteRepository};
pub use scheduler::{PassNotice, PassOutcome, Scheduler, SchedulerHandle};
pub use types::*;
