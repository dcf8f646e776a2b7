use crate::protocol::Message;

/// A bidirectional channel carrying whole protocol messages.
///
/// `recv` must be cancel safe: implementations keep partial-read state in
/// `self`, so the relay can race it against its outbox in `tokio::select!`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

#[async_trait::async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        (**self).send(msg).await
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        (**self).recv().await
    }
}

pub mod config;
pub mod in_memory;
pub mod tcp;

pub use config::TransportConfig;
