use log::{debug, error, warn};
use std::time::Duration;

use crate::frame;
use crate::transport::{Delay, NfcTransport, StdDelay};
use crate::types::{NfcError, PollTick, ReaderConfig, SessionState, Uid};

type DetectCallback = Box<dyn FnMut()>;

/// A PN532 module attached to a transport, plus the state of its poll loop.
///
/// Every operation takes `&mut self`, so a poll tick, an explicit detection
/// and console output can never interleave on the shared transport.
pub struct ReaderSession<T: NfcTransport, D: Delay = StdDelay> {
    transport: T,
    delay: D,
    config: ReaderConfig,
    transport_config: Option<T::Config>,
    state: SessionState,
    on_detect: Option<DetectCallback>,
}

impl<T: NfcTransport> ReaderSession<T, StdDelay> {
    /// Create a new session that pauses by sleeping the current thread
    pub fn new(transport: T) -> Self {
        Self::with_delay(transport, StdDelay)
    }
}

impl<T: NfcTransport, D: Delay> ReaderSession<T, D> {
    /// Create a new session with a custom pause implementation.
    ///
    /// The session starts disconnected; call [`configure`](Self::configure)
    /// to attach the transport to the module.
    pub fn with_delay(transport: T, delay: D) -> Self {
        Self {
            transport,
            delay,
            config: ReaderConfig::default(),
            transport_config: None,
            state: SessionState::Disconnected,
            on_detect: None,
        }
    }

    /// Replace the timings and read limits
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Attach the transport to the module and enable polling
    pub fn configure(&mut self, config: T::Config) -> Result<(), NfcError> {
        self.transport.redirect(&config).map_err(transport_error)?;
        debug!("Transport configured: {:?}", config);
        self.transport_config = Some(config);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Suspend the poll loop. No bytes are exchanged.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }

    /// Re-attach the transport with the parameters from the last `configure`
    pub fn reconnect(&mut self) -> Result<(), NfcError> {
        let config = self
            .transport_config
            .as_ref()
            .ok_or(NfcError::NotConfigured)?;
        self.transport.redirect(config).map_err(transport_error)?;
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Register the callback the poll loop invokes when a card is detected.
    /// Replaces any previously registered callback.
    pub fn on_card_detected<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.on_detect = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.on_detect = None;
    }

    /// Is a card in the field?
    ///
    /// Makes exactly one wake + detect + read attempt. Any failure, including
    /// transport errors, reads as "no card".
    pub fn detect(&mut self) -> bool {
        match self.try_read_uid() {
            Ok(uid) => uid.is_some(),
            Err(e) => {
                warn!("Card detection failed: {}", e);
                false
            }
        }
    }

    /// UID of the card in the field as uppercase hex, or an empty string
    pub fn read_uid(&mut self) -> String {
        match self.try_read_uid() {
            Ok(Some(uid)) => uid.to_hex(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("UID read failed: {}", e);
                String::new()
            }
        }
    }

    /// Single detection attempt.
    ///
    /// Transport failures are returned as errors; a reply that does not carry
    /// a UID (no data, no marker, truncated, bad length, no target) is `Ok(None)`.
    pub fn try_read_uid(&mut self) -> Result<Option<Uid>, NfcError> {
        let response = self.exchange()?;

        match frame::parse_uid(&response) {
            Ok(uid) => {
                debug!("Card detected, UID {}", uid);
                Ok(Some(uid))
            }
            Err(reason) => {
                debug!("No card: {}", reason);
                Ok(None)
            }
        }
    }

    /// Run one poll loop tick.
    ///
    /// Idle while disconnected or without a callback. Otherwise detects, calls
    /// the callback once on success and pauses `poll_interval` either way.
    pub fn poll_once(&mut self) -> PollTick {
        if self.state != SessionState::Connected || self.on_detect.is_none() {
            return PollTick::Idle;
        }

        let tick = if self.detect() {
            if let Some(callback) = self.on_detect.as_mut() {
                callback();
            }
            PollTick::CardDetected
        } else {
            PollTick::NoCard
        };

        self.delay.pause(self.config.poll_interval);
        tick
    }

    /// Poll forever
    pub fn run(&mut self) -> ! {
        loop {
            if self.poll_once() == PollTick::Idle {
                self.delay.pause(self.config.idle_interval);
            }
        }
    }

    /// Print a line on the host console.
    ///
    /// See [`with_console`](Self::with_console) for how the transport is
    /// borrowed and given back.
    pub fn print_to_console(&mut self, text: &str) -> Result<(), NfcError> {
        self.with_console(|transport| {
            transport.write(text.as_bytes())?;
            transport.write(b"\r\n")?;
            Ok(())
        })
    }

    /// Route the transport to the host console for the duration of `emit`.
    ///
    /// Polling is suspended first. The module route is restored and polling
    /// resumed on every exit path, including a failing or panicking `emit`.
    pub fn with_console<R, F>(&mut self, emit: F) -> Result<R, NfcError>
    where
        F: FnOnce(&mut T) -> Result<R, T::Error>,
    {
        if self.transport_config.is_none() {
            return Err(NfcError::NotConfigured);
        }

        let mut diversion = ConsoleDiversion::begin(self);
        diversion
            .session
            .transport
            .redirect_to_console()
            .map_err(transport_error)?;

        let emitted = emit(&mut diversion.session.transport);
        diversion.restore()?;
        emitted.map_err(transport_error)
    }

    fn exchange(&mut self) -> Result<Vec<u8>, NfcError> {
        self.transport
            .set_rx_buffer_size(self.config.rx_buffer_size)
            .map_err(transport_error)?;
        self.wake()?;
        self.send(frame::detect_target_command())?;
        self.read_available(self.config.response_settle, self.config.response_read_max)
    }

    fn wake(&mut self) -> Result<(), NfcError> {
        self.send(frame::wake_sequence())?;
        let discarded = self.read_available(self.config.wake_settle, self.config.wake_drain_max)?;
        debug!("Discarded {} bytes after wake", discarded.len());
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), NfcError> {
        debug!("Sending: {:02X?}", data);
        let written = self.transport.write(data).map_err(transport_error)?;
        debug!("Wrote {} bytes", written);
        Ok(())
    }

    /// Pause `settle`, then read at most `max` of the bytes already received
    fn read_available(&mut self, settle: Duration, max: usize) -> Result<Vec<u8>, NfcError> {
        self.delay.pause(settle);

        let available = self.transport.bytes_available().map_err(transport_error)?;
        if available == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; available.min(max)];
        let bytes_read = self.transport.read(&mut buf).map_err(transport_error)?;
        buf.truncate(bytes_read);
        debug!("Received {} bytes: {:02X?}", bytes_read, buf);
        Ok(buf)
    }
}

/// Holds the session while its transport points at the console and puts
/// the module route back when dropped.
struct ConsoleDiversion<'a, T: NfcTransport, D: Delay> {
    session: &'a mut ReaderSession<T, D>,
    restored: bool,
}

impl<'a, T: NfcTransport, D: Delay> ConsoleDiversion<'a, T, D> {
    fn begin(session: &'a mut ReaderSession<T, D>) -> Self {
        session.state = SessionState::Disconnected;
        Self {
            session,
            restored: false,
        }
    }

    fn restore(mut self) -> Result<(), NfcError> {
        self.restored = true;
        self.session.reconnect()
    }
}

impl<T: NfcTransport, D: Delay> Drop for ConsoleDiversion<'_, T, D> {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.session.reconnect() {
                error!("Failed to restore NFC transport after console output: {}", e);
            }
        }
    }
}

fn transport_error<E: std::fmt::Debug>(e: E) -> NfcError {
    NfcError::Transport(format!("{:?}", e))
}
