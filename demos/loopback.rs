//! Loopback demo: a toy in-process broker and an acking echo server.
//!
//! Run with `cargo run --example loopback`.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use broker_rpc::{Reply, RpcClient, Subscription, Transport, TransportError, ACK};
use tokio::{sync::mpsc, time::sleep};

type Handler = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Minimal in-process broker: handlers play the server side, inbox
/// subscriptions receive the ack and the response.
#[derive(Clone, Default)]
struct LoopbackBroker {
    inner: Arc<BrokerState>,
}

#[derive(Default)]
struct BrokerState {
    handlers: Mutex<HashMap<String, Handler>>,
    subscriptions: Mutex<HashMap<String, mpsc::UnboundedSender<Vec<u8>>>>,
    inboxes: AtomicUsize,
}

impl LoopbackBroker {
    /// Registers a server-side handler for one request subject.
    fn serve(&self, subject: &str, handler: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) {
        self.inner
            .handlers
            .lock()
            .expect("handler table mutex must not be poisoned")
            .insert(subject.to_owned(), Arc::new(handler));
    }
}

#[async_trait]
impl Transport for LoopbackBroker {
    async fn ensure_connected(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn publish(
        &self,
        subject: &str,
        payload: &[u8],
        reply_to: &str,
    ) -> Result<(), TransportError> {
        let handler = self
            .inner
            .handlers
            .lock()
            .expect("handler table mutex must not be poisoned")
            .get(subject)
            .cloned()
            .ok_or_else(|| TransportError::Other(format!("no server listening on {subject}")))?;
        let sender = self
            .inner
            .subscriptions
            .lock()
            .expect("subscription table mutex must not be poisoned")
            .get(reply_to)
            .cloned()
            .ok_or_else(|| TransportError::Other(format!("unknown inbox {reply_to}")))?;

        // Ack fast, respond a beat later, like a real worker would.
        let response = handler(payload);
        tokio::spawn(async move {
            let _ = sender.send(ACK.to_vec());
            sleep(Duration::from_millis(10)).await;
            let _ = sender.send(response);
        });
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscriptions
            .lock()
            .expect("subscription table mutex must not be poisoned")
            .insert(subject.to_owned(), tx);
        Ok(Box::new(InboxSubscription { receiver: rx }))
    }

    fn new_inbox(&self) -> String {
        format!("_INBOX.{}", self.inner.inboxes.fetch_add(1, Ordering::SeqCst))
    }
}

struct InboxSubscription {
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl Subscription for InboxSubscription {
    async fn next(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let broker = LoopbackBroker::default();
    broker.serve("rpc.echo.shout", |payload| payload.to_ascii_uppercase());

    let client = RpcClient::new(Arc::new(broker), "echo", "shout");
    match client.send_request(b"hello broker").await? {
        Reply::Payload(body) => println!("response: {}", String::from_utf8_lossy(&body)),
        Reply::Nack => println!("server declined the request"),
    }
    Ok(())
}
