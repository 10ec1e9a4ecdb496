//! Read card UIDs from a PN532 module on a serial port.
//!
//! ```text
//! RUST_LOG=debug cargo run --example poll --features serial -- /dev/ttyUSB0
//! ```

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use clap::Parser;
use pn532_uid::{ReaderSession, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};

#[derive(Parser, Debug)]
#[command(about = "Detect NFC cards with a PN532 module over UART")]
struct Args {
    /// Serial device the module is attached to
    port: String,

    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Read a single UID and exit instead of polling
    #[arg(long)]
    once: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut nfc = ReaderSession::new(SerialTransport::new());
    nfc.configure(SerialConfig::new(&args.port).with_baud_rate(args.baud))?;
    log::info!("Listening on {} at {} baud", args.port, args.baud);

    if args.once {
        let uid = nfc.read_uid();
        if uid.is_empty() {
            nfc.print_to_console("No card")?;
        } else {
            nfc.print_to_console(&format!("Card {}", uid))?;
        }
        return Ok(());
    }

    let detections = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&detections);
    nfc.on_card_detected(move || {
        counter.set(counter.get() + 1);
        log::info!("Card detected ({} so far)", counter.get());
    });

    nfc.run()
}
