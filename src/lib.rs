//! `arq` — reliable one-way delivery over a lossy, order-preserving channel,
//! with Go-Back-N and Selective Repeat as interchangeable policies.
//!
//! # Architecture
//!
//! ```text
//!  upper layer                                        upper layer
//!      │ submit                                            ▲ to_application
//!  ┌───▼──────┐    data     ┌─────────┐    data     ┌──────┴───┐
//!  │  Sender  │────────────▶│ Channel │────────────▶│ Receiver │
//!  │ GBN / SR │◀────────────│ (lossy) │◀────────────│ GBN / SR │
//!  └───▲──────┘    ACKs     └─────────┘    ACKs     └──────────┘
//!      │ on_timeout
//!  ┌───┴───┐
//!  │ Timer │
//!  └───────┘
//! ```
//!
//! Protocol handlers never perform I/O themselves; every effect goes through
//! a [`context::Context`].  The [`simulator`] provides one, driven by a
//! discrete-event queue.
//!
//! Each module has a single responsibility:
//! - [`packet`]       — packet/message types, checksum, corruption check
//! - [`seq`]          — modular sequence-number arithmetic
//! - [`config`]       — protocol constants, policy selection, validation
//! - [`context`]      — collaborator surface and an in-memory recorder
//! - [`stats`]        — observability counters
//! - [`send_window`]  — outstanding-packet bookkeeping
//! - [`sender`]       — send-side interface and admission
//! - [`gbn_sender`]   — Go-Back-N send strategy
//! - [`sr_sender`]    — Selective Repeat send strategy
//! - [`receiver`]     — receive-side interface
//! - [`gbn_receiver`] — Go-Back-N receive strategy
//! - [`sr_receiver`]  — Selective Repeat receive strategy
//! - [`channel`]      — loss / delay / corruption fault model
//! - [`timer`]        — single-shot timer with stale-expiry detection
//! - [`simulator`]    — discrete-event harness
//! - [`realtime`]     — paces the simulator on the tokio clock

pub mod channel;
pub mod config;
pub mod context;
pub mod gbn_receiver;
pub mod gbn_sender;
pub mod packet;
pub mod realtime;
pub mod receiver;
pub mod send_window;
pub mod sender;
pub mod seq;
pub mod simulator;
pub mod sr_receiver;
pub mod sr_sender;
pub mod stats;
pub mod timer;

pub use config::{ArqConfig, ConfigError, Policy};
pub use context::{Context, Recorder, Role};
pub use packet::{Message, Packet, Payload};
pub use receiver::{new_receiver, Receiver};
pub use sender::{new_sender, Sender};
pub use simulator::{Report, Simulator, SimulatorConfig};
