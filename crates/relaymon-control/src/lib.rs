//! Remote control channel for the relaymon agent.
//!
//! A [`channel::ControlChannel`] owns one persistent WebSocket connection to
//! a remote controller, reconnecting with a fixed backoff until it succeeds
//! or is cancelled. Once connected it runs two duties: an inbound listener
//! that reads requests, resolves them through the [`dispatch::Dispatcher`],
//! and writes back correlated responses, and a lifecycle watcher that drives
//! graceful shutdown.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
