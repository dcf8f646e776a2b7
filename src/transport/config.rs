use tokio::time::Duration;

/// Default timeout for a single send (30 seconds).
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame body size (64 KiB). Protocol messages are a few hundred bytes.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Tunables for framed transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Give up on `recv` after this long. `None` waits indefinitely, which is
    /// what a client waiting for its opponent wants.
    pub recv_timeout: Option<Duration>,
    pub send_timeout: Duration,
    pub max_frame_size: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            recv_timeout: None,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl TransportConfig {
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }
}
