//! DrishtiIO - SDK for DTrack2/DTRACK3 optical tracking controllers
//!
//! This library receives DTRACK measurement datagrams (line-oriented ASCII
//! over UDP) and converts them into typed frames, exchanges `dtrack2`
//! command strings with the controller over TCP, and sends tactile /
//! Flystick feedback datagrams back.
//!
//! The entry point is [`DrishtiIO`], constructed from a single connection
//! string:
//!
//! ```no_run
//! use drishti_io::DrishtiIO;
//!
//! # fn main() -> drishti_io::Result<()> {
//! let dt = DrishtiIO::new("192.168.0.1:5000")?;
//! dt.start_measurement()?;
//! let frame = dt.receive()?;
//! for body in &frame.bodies {
//!     if body.is_tracked() {
//!         println!("body {} at {:?}", body.id, body.loc);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The library never initializes a logger; binaries configure the `log`
//! backend of their choice.

pub mod config;
pub mod error;
pub mod feedback;
pub mod parser;
pub mod protocol;
pub mod sdk;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{Connection, Settings};
pub use error::{Error, ErrorKind, Result};
pub use parser::parse_frame;
pub use protocol::{EventMessage, ResponseClass};
pub use sdk::DrishtiIO;
pub use types::*;
