use std::fmt;
use std::sync::Arc;

use tokio::time::{sleep, timeout, timeout_at, Instant};

use crate::{
    config::{TimingConfig, NACK_BACKOFF_INTERVALS},
    protocol::{self, Reply, Signal},
    subject,
    transport::{Transport, TransportError},
    CallOptions, Error, Result,
};

/// Dispatch attempts allowed when no ack or response arrives in time.
pub const ACK_TIMEOUT_RETRIES: usize = 3;

/// Dispatch attempts allowed while the broker connection is reconnecting.
pub const RECONNECT_RETRIES: usize = 3;

/// RPC client for one service method.
///
/// Construction resolves the timing policy from the environment once; the
/// client is read-only afterwards and can be shared freely across calls.
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    service: String,
    method: String,
    config: TimingConfig,
    call_options: CallOptions,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("service", &self.service)
            .field("method", &self.method)
            .field("config", &self.config)
            .field("call_options", &self.call_options)
            .finish()
    }
}

impl RpcClient {
    /// Creates a client for `service`/`method` over an established broker
    /// connection, resolving budgets with [`TimingConfig::from_env`].
    pub fn new(
        transport: Arc<dyn Transport>,
        service: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            service: service.into(),
            method: method.into(),
            config: TimingConfig::from_env(),
            call_options: CallOptions::default(),
        }
    }

    /// Replaces the resolved timing policy.
    pub fn with_config(mut self, config: TimingConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets default per-call overrides applied by [`RpcClient::send_request`].
    pub fn with_call_options(mut self, options: CallOptions) -> Self {
        self.call_options = options;
        self
    }

    /// The resolved timing policy.
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Dispatches `payload` and drives the retry loop to completion.
    ///
    /// Each attempt re-validates the connection, performs one
    /// publish/ack/respond exchange, and classifies the outcome:
    ///
    /// - a NACK sleeps the next entry of [`NACK_BACKOFF_INTERVALS`] and
    ///   retries, up to the table length;
    /// - an ack timeout retries immediately, up to
    ///   [`ACK_TIMEOUT_RETRIES`] attempts;
    /// - a reconnecting transport sleeps the full reconnect delay and
    ///   retries, up to [`RECONNECT_RETRIES`] attempts, after which the
    ///   original transport error is surfaced unmodified;
    /// - any other transport failure propagates without retry.
    ///
    /// Exhausting the NACK or ack-timeout budget surfaces
    /// [`Error::Timeout`].
    pub async fn send_request(&self, payload: &[u8]) -> Result<Reply> {
        self.send_request_with(payload, self.call_options.clone())
            .await
    }

    /// [`RpcClient::send_request`] with explicit per-call overrides.
    pub async fn send_request_with(&self, payload: &[u8], options: CallOptions) -> Result<Reply> {
        let key = subject::cached_subscription_key(&self.service, &self.method);
        let mut attempt = 0usize;
        loop {
            self.transport.ensure_connected().await?;
            match self
                .request_with_two_replies(key.subject(), payload, &options)
                .await
            {
                Ok(Reply::Payload(body)) => return Ok(Reply::Payload(body)),
                Ok(Reply::Nack) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, "request nacked, backing off");
                    sleep(NACK_BACKOFF_INTERVALS[attempt]).await;
                    attempt += 1;
                    if attempt >= NACK_BACKOFF_INTERVALS.len() {
                        return Err(Error::Timeout);
                    }
                }
                Err(Error::Timeout) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, "no ack or response in time, retrying");
                    attempt += 1;
                    if attempt >= ACK_TIMEOUT_RETRIES {
                        return Err(Error::Timeout);
                    }
                }
                Err(Error::Transport(cause @ TransportError::Reconnecting)) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, "broker reconnecting, waiting before retry");
                    sleep(self.config.reconnect_delay).await;
                    attempt += 1;
                    if attempt >= RECONNECT_RETRIES {
                        return Err(Error::Transport(cause));
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Performs one publish/ack/respond exchange on an ephemeral inbox.
    ///
    /// The first message on the inbox decides the path: an ack opens a
    /// second bounded wait for the response, a nack resolves the call
    /// immediately, and a response body short-circuits both waits. The two
    /// signals may arrive in either order; whatever arrives after the call
    /// resolves is dropped with the subscription, never surfaced to a
    /// later call.
    pub async fn request_with_two_replies(
        &self,
        subject: &str,
        payload: &[u8],
        options: &CallOptions,
    ) -> Result<Reply> {
        let ack_budget = options.ack_timeout.unwrap_or(self.config.ack_timeout);
        let response_budget = options.timeout.unwrap_or(self.config.response_timeout);

        let inbox = self.transport.new_inbox();
        let mut replies = self.transport.subscribe(&inbox).await?;
        self.transport.publish(subject, payload, &inbox).await?;

        let first = match timeout(ack_budget, replies.next()).await {
            Ok(Some(body)) => body,
            Ok(None) => return Err(TransportError::SubscriptionClosed.into()),
            Err(_) => return Err(Error::Timeout),
        };
        match protocol::classify(&first) {
            Signal::Nack => return Ok(Reply::Nack),
            Signal::Response => return Ok(Reply::Payload(first)),
            Signal::Ack => {}
        }

        // The ack arrived; the response gets its own budget. A duplicate
        // ack does not reset the deadline.
        let deadline = Instant::now() + response_budget;
        loop {
            let body = match timeout_at(deadline, replies.next()).await {
                Ok(Some(body)) => body,
                Ok(None) => return Err(TransportError::SubscriptionClosed.into()),
                Err(_) => return Err(Error::Timeout),
            };
            match protocol::classify(&body) {
                Signal::Nack => return Ok(Reply::Nack),
                Signal::Response => return Ok(Reply::Payload(body)),
                Signal::Ack => {}
            }
        }
    }
}
