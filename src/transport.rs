use std::time::Duration;

/// Trait for NFC module communication backends.
/// Implement this trait for different transports (UART, serial port, etc.)
pub trait NfcTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Parameters needed to (re)attach the transport to the module
    type Config: Clone + std::fmt::Debug;

    /// Write data to the transport
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Number of received bytes that can be read without blocking
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes that are already available
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Make sure the receive buffer holds at least `size` bytes.
    ///
    /// Backends whose buffer is owned by the OS or driver can keep the default.
    fn set_rx_buffer_size(&mut self, _size: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Route the transport to the module using `config`
    fn redirect(&mut self, config: &Self::Config) -> Result<(), Self::Error>;

    /// Route the transport to the host console
    fn redirect_to_console(&mut self) -> Result<(), Self::Error>;
}

/// Cooperative pause used for settle and poll intervals.
pub trait Delay {
    fn pause(&mut self, duration: Duration);
}

/// [`Delay`] that sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
