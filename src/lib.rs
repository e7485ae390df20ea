//! `broker-rpc` is an async RPC client transport for pub/sub message brokers.
//!
//! A request is published on a service subject with an ephemeral reply inbox
//! attached. The server sends up to two signals back on that inbox: a fast
//! [`ACK`]/[`NACK`] marker and the final response payload, in either order.
//! [`RpcClient::send_request`] reconciles both into a single [`Reply`],
//! retrying negative acknowledgments, ack timeouts, and broker reconnects
//! with a distinct policy per failure category.
//!
//! The broker connection itself lives behind the [`Transport`] trait; any
//! broker binding (or an in-memory fake) can implement it.

mod client;
mod config;
mod error;
mod options;
mod protocol;
mod subject;
mod transport;

pub use client::{RpcClient, ACK_TIMEOUT_RETRIES, RECONNECT_RETRIES};
pub use config::{
    nack_backoff_total, TimingConfig, ACK_TIMEOUT_VAR, NACK_BACKOFF_INTERVALS,
    RECONNECT_DELAY_VAR, RESPONSE_TIMEOUT_VAR,
};
pub use error::Error;
pub use options::CallOptions;
pub use protocol::{Reply, ACK, NACK};
pub use subject::{cached_subscription_key, clear_subscription_key_cache, SubscriptionKey};
pub use transport::{Subscription, Transport, TransportError};

pub type Result<T> = std::result::Result<T, Error>;
