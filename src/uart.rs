//! UART transport for ESP32 using esp-idf-svc

use crate::transport::NfcTransport;
use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio::{self, InputPin, OutputPin};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self { baud_rate: 115_200 }
    }
}

/// UART backend. TX/RX pins are bound when the driver is created; the
/// console route writes to the ESP-IDF stdout console.
pub struct UartTransport<'a> {
    uart: UartDriver<'a>,
    console: bool,
}

impl<'a> UartTransport<'a> {
    pub fn new(
        uart: impl Peripheral<P = impl uart::Uart> + 'a,
        tx: impl Peripheral<P = impl OutputPin> + 'a,
        rx: impl Peripheral<P = impl InputPin> + 'a,
        config: UartConfig,
    ) -> Result<Self, EspError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<gpio::Gpio0>::None,
            Option::<gpio::Gpio0>::None,
            &uart_config,
        )?;
        uart.clear_rx()?;

        Ok(Self {
            uart,
            console: false,
        })
    }
}

impl NfcTransport for UartTransport<'_> {
    type Error = EspError;
    type Config = UartConfig;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.console {
            let mut stdout = std::io::stdout();
            // stdout on ESP-IDF is the console UART; a failed write has no better place to go
            let _ = stdout.write_all(data).and_then(|_| stdout.flush());
            return Ok(data.len());
        }
        self.uart.write(data)
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if self.console {
            return Ok(0);
        }
        self.uart.remaining_read()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.console {
            return Ok(0);
        }
        self.uart.read(buf, NON_BLOCK)
    }

    fn redirect(&mut self, config: &Self::Config) -> Result<(), Self::Error> {
        self.uart.change_baudrate(Hertz(config.baud_rate))?;
        self.uart.clear_rx()?;
        self.console = false;
        Ok(())
    }

    fn redirect_to_console(&mut self) -> Result<(), Self::Error> {
        self.console = true;
        Ok(())
    }
}
