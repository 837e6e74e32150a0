//! Driving the external `ch341eeprom` programmer.
//!
//! All physical EEPROM access goes through a separate executable that owns
//! the USB protocol. Its command line contract:
//!
//! - `--erase --size <class>`
//! - `--read <file> --size <class>`
//! - `--write <file> --size <class>`
//! - `--verify <file> --size <class>`
//!
//! Data is handed over through files, success is signalled solely by the
//! exit status. Invocations block until the tool exits; there is no
//! timeout.

mod tool;

pub use self::tool::Ch341EepromTool;

use std::process::ExitStatus;

use failure::Fail;

use crate::AResult;

#[derive(Debug, Fail)]
#[fail(display = "external programmer {} failed with {}", operation, status)]
pub struct ExternalToolError {
	pub operation: &'static str,
	pub status: ExitStatus,
}

/// The capabilities the batch loop needs from a programmer.
///
/// `Ch341EepromTool` is the real implementation; tests substitute their own.
pub trait Programmer {
	fn erase(&mut self) -> AResult<()>;
	fn read(&mut self) -> AResult<Vec<u8>>;
	fn write(&mut self, image: &[u8]) -> AResult<()>;
	fn verify(&mut self, image: &[u8]) -> AResult<()>;
}
