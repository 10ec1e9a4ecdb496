//! Serial port transport for desktop using serialport crate

use crate::transport::NfcTransport;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Baud rate the PN532 HSU interface uses out of reset
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
}

impl SerialConfig {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

enum Route {
    Detached,
    Module(Box<dyn serialport::SerialPort>),
    Console,
}

/// Serial port backend. The console route is the process's stdout.
///
/// The port is opened by [`NfcTransport::redirect`], normally through
/// `ReaderSession::configure`.
pub struct SerialTransport {
    route: Route,
}

impl SerialTransport {
    pub fn new() -> Self {
        Self {
            route: Route::Detached,
        }
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn detached() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "serial transport is not attached")
}

impl NfcTransport for SerialTransport {
    type Error = io::Error;
    type Config = SerialConfig;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        match &mut self.route {
            Route::Module(port) => port.write(data),
            Route::Console => {
                let mut stdout = io::stdout().lock();
                let written = stdout.write(data)?;
                stdout.flush()?;
                Ok(written)
            }
            Route::Detached => Err(detached()),
        }
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        match &self.route {
            Route::Module(port) => port
                .bytes_to_read()
                .map(|n| n as usize)
                .map_err(io::Error::other),
            Route::Console => Ok(0),
            Route::Detached => Err(detached()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match &mut self.route {
            Route::Module(port) => port.read(buf),
            Route::Console => Ok(0),
            Route::Detached => Err(detached()),
        }
    }

    fn redirect(&mut self, config: &Self::Config) -> Result<(), Self::Error> {
        // Release the previous handle before opening the same device again
        self.route = Route::Detached;

        let port = serialport::new(&config.port_name, config.baud_rate)
            .timeout(Duration::from_millis(10))
            .open()
            .map_err(io::Error::other)?;
        port.clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::other)?;

        self.route = Route::Module(port);
        Ok(())
    }

    fn redirect_to_console(&mut self) -> Result<(), Self::Error> {
        self.route = Route::Console;
        Ok(())
    }
}
