use std::time::Duration;

/// Per-call overrides for the dispatch budgets.
///
/// Unset fields fall back to the client's resolved
/// [`TimingConfig`](crate::TimingConfig).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Budget for the first signal on the reply inbox.
    pub ack_timeout: Option<Duration>,
    /// Budget for the final response once an ack has arrived.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    /// Overrides the ack wait budget for this call.
    pub fn ack_timeout(mut self, budget: Duration) -> Self {
        self.ack_timeout = Some(budget);
        self
    }

    /// Overrides the response wait budget for this call.
    pub fn timeout(mut self, budget: Duration) -> Self {
        self.timeout = Some(budget);
        self
    }
}
