use tokio::time::Duration;

use crate::transport::TransportConfig;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

/// Rooms with no traffic for this long are closed (5 minutes).
pub const DEFAULT_ROOM_TIMEOUT: Duration = Duration::from_secs(300);

/// How often idle rooms are looked for.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Relay tunables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: String,
    pub room_timeout: Duration,
    pub sweep_interval: Duration,
    pub transport: TransportConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            room_timeout: DEFAULT_ROOM_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            transport: TransportConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_room_timeout(mut self, timeout: Duration) -> Self {
        self.room_timeout = timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}
