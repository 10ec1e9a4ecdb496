//! PN532 NFC reader driver for reading Type A card UIDs over UART, with
//! support for multiple transport backends.
//!
//! # Features
//!
//! - `uart-esp32` - UART transport for ESP32 using esp-idf-svc
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use pn532_uid::{ReaderSession, SerialConfig, SerialTransport};
//!
//! let mut nfc = ReaderSession::new(SerialTransport::new());
//! nfc.configure(SerialConfig::new("/dev/ttyUSB0"))?;
//!
//! let uid = nfc.read_uid();
//! if !uid.is_empty() {
//!     nfc.print_to_console(&format!("Found card: {}", uid))?;
//! }
//! ```

pub mod frame;
mod reader;
mod transport;
mod types;

#[cfg(feature = "uart-esp32")]
mod uart;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use frame::{extract_uid, locate_response_marker, parse_uid};
pub use reader::ReaderSession;
pub use transport::{Delay, NfcTransport, StdDelay};
pub use types::{
    bytes_to_hex, FrameError, NfcError, PollTick, ReaderConfig, SessionState, Uid, UID_MAX_LEN,
    UID_MIN_LEN,
};

#[cfg(feature = "uart-esp32")]
pub use uart::{UartConfig, UartTransport};

#[cfg(feature = "serial")]
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
