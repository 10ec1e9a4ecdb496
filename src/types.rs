//! Types for NFC reader operations

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Shortest UID a Type A card reports
pub const UID_MIN_LEN: usize = 4;
/// Longest UID a Type A card reports (triple size)
pub const UID_MAX_LEN: usize = 10;

/// Unique identifier of a detected card
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid {
    bytes: Vec<u8>,
}

impl Uid {
    /// Build a UID from raw bytes, `None` unless the length is within 4..=10
    pub fn new(bytes: &[u8]) -> Option<Self> {
        if (UID_MIN_LEN..=UID_MAX_LEN).contains(&bytes.len()) {
            Some(Self {
                bytes: bytes.to_vec(),
            })
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false, a UID holds at least four bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Uppercase hex without separators, e.g. `"04A1B2C3"`
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.bytes)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bytes {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Uid {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Whether the background poll loop may use the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Disconnected,
}

/// Outcome of a single poll loop tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTick {
    /// Disconnected or no callback registered; nothing was sent
    Idle,
    /// Detection ran and found no card
    NoCard,
    /// A card was detected and the callback was invoked
    CardDetected,
}

/// Timings and read limits used by a [`crate::ReaderSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Receive buffer size requested before each detection
    pub rx_buffer_size: usize,
    /// Pause after the wake sequence before draining its reply
    pub wake_settle: Duration,
    /// Upper bound on bytes drained after waking the chip
    pub wake_drain_max: usize,
    /// Pause after the detect command before reading the reply
    pub response_settle: Duration,
    /// Upper bound on bytes read as the detect reply
    pub response_read_max: usize,
    /// Pause after every active poll tick
    pub poll_interval: Duration,
    /// Scheduler wait between idle poll ticks
    pub idle_interval: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            rx_buffer_size: 128,
            wake_settle: Duration::from_millis(50),
            wake_drain_max: 64,
            response_settle: Duration::from_millis(60),
            response_read_max: 80,
            poll_interval: Duration::from_millis(50),
            idle_interval: Duration::from_millis(20),
        }
    }
}

impl ReaderConfig {
    pub fn with_wake_settle(mut self, settle: Duration) -> Self {
        self.wake_settle = settle;
        self
    }

    pub fn with_response_settle(mut self, settle: Duration) -> Self {
        self.response_settle = settle;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the drain and reply read caps
    pub fn with_read_limits(mut self, wake_drain_max: usize, response_read_max: usize) -> Self {
        self.wake_drain_max = wake_drain_max;
        self.response_read_max = response_read_max;
        self
    }
}

/// Reasons a read window did not yield a UID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Nothing was received after the settle interval
    #[error("no bytes received")]
    NoData,
    /// The InListPassiveTarget reply marker was not found
    #[error("response marker D5 4B not found")]
    NoMarker,
    /// The reply stops before the header or the declared UID ends
    #[error("response frame truncated")]
    TruncatedFrame,
    /// Declared UID length outside 4..=10
    #[error("invalid UID length: {0}")]
    InvalidUidLength(u8),
    /// The chip answered but reported no target in the field
    #[error("no target reported")]
    ZeroTargets,
}

/// Errors that can occur during reader session operations
#[derive(Debug, Error)]
pub enum NfcError {
    /// Transport layer error (UART, serial, etc.)
    #[error("transport error: {0}")]
    Transport(String),
    /// The operation needs transport parameters from a prior `configure`
    #[error("transport was never configured")]
    NotConfigured,
}

/// Convert bytes to uppercase hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
