//! Configuration record for the CH341 USB-to-serial family, stored in a
//! small 24cXX I²C EEPROM next to the chip.
//!
//! The record is a flat, offset-addressed image (all offsets from the start
//! of the image):
//!
//! - 0: sync marker 0x53
//! - 1: mode byte
//! - 2: config byte
//! - 3: reserved (zero)
//! - 4..=5: USB vendor ID, little-endian
//! - 6..=7: USB product ID, little-endian
//! - 8: minor version
//! - 9: major version
//! - 10..=15: reserved (zero)
//! - 16..=23: serial number, 8 ASCII bytes, no terminator
//! - 24..=31: reserved (zero)
//! - 32..: product string, ASCII, trailing bytes stay zero
//!
//! The image handed to the programmer is one byte shorter than the EEPROM
//! itself.

mod decode;
mod image;

pub use self::decode::{
	ImageFields,
	decode,
};

pub use self::image::{
	ConstructionError,
	EepromImage,
};

use std::fmt;
use std::str;

pub const SYNC_BYTE: u8 = 0x53;

// hardware defaults for the CH341SER adapter family
pub const DEFAULT_MODE: u8 = 0x12;
pub const DEFAULT_CONFIG: u8 = 0xCC;
pub const DEFAULT_VENDOR_ID: VendorId = VendorId(0x1A86);
pub const DEFAULT_PRODUCT_ID: ProductId = ProductId(0x5512);

/// EEPROM capacity by 24cXX part label, as understood by the external
/// programmer's `--size` flag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SizeClass {
	Kbit1,
	Kbit2,
	Kbit4,
	Kbit8,
	Kbit16,
	Kbit32,
	Kbit64,
	Kbit128,
	Kbit256,
	Kbit512,
	Kbit1024,
}

impl SizeClass {
	pub fn size_bytes(&self) -> usize {
		match *self {
			SizeClass::Kbit1 => 128,
			SizeClass::Kbit2 => 256,
			SizeClass::Kbit4 => 512,
			SizeClass::Kbit8 => 1024,
			SizeClass::Kbit16 => 2048,
			SizeClass::Kbit32 => 4096,
			SizeClass::Kbit64 => 8192,
			SizeClass::Kbit128 => 16384,
			SizeClass::Kbit256 => 32768,
			SizeClass::Kbit512 => 65536,
			SizeClass::Kbit1024 => 131072,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match *self {
			SizeClass::Kbit1 => "24c01",
			SizeClass::Kbit2 => "24c02",
			SizeClass::Kbit4 => "24c04",
			SizeClass::Kbit8 => "24c08",
			SizeClass::Kbit16 => "24c16",
			SizeClass::Kbit32 => "24c32",
			SizeClass::Kbit64 => "24c64",
			SizeClass::Kbit128 => "24c128",
			SizeClass::Kbit256 => "24c256",
			SizeClass::Kbit512 => "24c512",
			SizeClass::Kbit1024 => "24c1024",
		}
	}
}

impl fmt::Display for SizeClass {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl str::FromStr for SizeClass {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"24c01" => Ok(SizeClass::Kbit1),
			"24c02" => Ok(SizeClass::Kbit2),
			"24c04" => Ok(SizeClass::Kbit4),
			"24c08" => Ok(SizeClass::Kbit8),
			"24c16" => Ok(SizeClass::Kbit16),
			"24c32" => Ok(SizeClass::Kbit32),
			"24c64" => Ok(SizeClass::Kbit64),
			"24c128" => Ok(SizeClass::Kbit128),
			"24c256" => Ok(SizeClass::Kbit256),
			"24c512" => Ok(SizeClass::Kbit512),
			"24c1024" => Ok(SizeClass::Kbit1024),
			_ => bail!("unknown EEPROM size class: {:?}", s),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VendorId(pub u16);

impl fmt::Display for VendorId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ProductId(pub u16);

impl fmt::Display for ProductId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

#[cfg(test)]
mod test {
	use super::SizeClass;

	fn check_size_class(label: &str, size_class: SizeClass, size_bytes: usize) {
		match label.parse::<SizeClass>() {
			Err(e) => panic!("{} failed to parse as SizeClass: {}", label, e),
			Ok(sc) => assert_eq!(size_class, sc, "failed validating parsed {}", label),
		}
		assert_eq!(size_class.to_string(), label, "failed stringifying {:?}", size_class);
		assert_eq!(size_class.size_bytes(), size_bytes, "wrong size for {:?}", size_class);
	}

	fn check_invalid_size_class(label: &str) {
		assert!(label.parse::<SizeClass>().is_err(), "{:?} must not be a valid size class", label);
	}

	#[test]
	fn parse_size_class() {
		check_size_class("24c01", SizeClass::Kbit1, 128);
		check_size_class("24c02", SizeClass::Kbit2, 256);
		check_size_class("24c04", SizeClass::Kbit4, 512);
		check_size_class("24c08", SizeClass::Kbit8, 1024);
		check_size_class("24c16", SizeClass::Kbit16, 2048);
		check_size_class("24c32", SizeClass::Kbit32, 4096);
		check_size_class("24c64", SizeClass::Kbit64, 8192);
		check_size_class("24c128", SizeClass::Kbit128, 16384);
		check_size_class("24c256", SizeClass::Kbit256, 32768);
		check_size_class("24c512", SizeClass::Kbit512, 65536);
		check_size_class("24c1024", SizeClass::Kbit1024, 131072);
		check_invalid_size_class("");
		check_invalid_size_class("24c");
		check_invalid_size_class("24c03");
		check_invalid_size_class("24C02");
		check_invalid_size_class("93c46");
	}
}
