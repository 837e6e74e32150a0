use std::fmt;

use failure::Fail;

use super::{
	ProductId,
	SizeClass,
	VendorId,
	DEFAULT_CONFIG,
	DEFAULT_MODE,
	DEFAULT_PRODUCT_ID,
	DEFAULT_VENDOR_ID,
	SYNC_BYTE,
};

const SERIAL_LEN: usize = 8;
const PRODUCT_MAX_LEN: usize = 94;

const SERIAL_OFFSET: usize = 16;
const PRODUCT_OFFSET: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum ConstructionError {
	#[fail(display = "serial number must be exactly 8 characters, got {}", _0)]
	SerialLength(usize),
	#[fail(display = "product string too long: {} characters (at most 94)", _0)]
	ProductLength(usize),
}

/// Descriptor for one device's configuration image.
///
/// Validated on construction; `build` cannot fail afterwards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EepromImage {
	size: SizeClass,
	major_version: u8,
	minor_version: u8,
	serial: String,
	product: String,
	mode: u8,
	config: u8,
	vendor_id: VendorId,
	product_id: ProductId,
}

impl EepromImage {
	pub fn new(
		size: SizeClass,
		major_version: u8,
		minor_version: u8,
		serial: &str,
		product: &str,
	) -> Result<EepromImage, ConstructionError> {
		EepromImage::with_hardware_ids(
			size,
			major_version,
			minor_version,
			serial,
			product,
			DEFAULT_MODE,
			DEFAULT_CONFIG,
			DEFAULT_VENDOR_ID,
			DEFAULT_PRODUCT_ID,
		)
	}

	pub fn with_hardware_ids(
		size: SizeClass,
		major_version: u8,
		minor_version: u8,
		serial: &str,
		product: &str,
		mode: u8,
		config: u8,
		vendor_id: VendorId,
		product_id: ProductId,
	) -> Result<EepromImage, ConstructionError> {
		if serial.len() != SERIAL_LEN {
			return Err(ConstructionError::SerialLength(serial.len()));
		}
		if product.len() > PRODUCT_MAX_LEN {
			return Err(ConstructionError::ProductLength(product.len()));
		}

		Ok(EepromImage {
			size,
			major_version,
			minor_version,
			serial: serial.into(),
			product: product.into(),
			mode,
			config,
			vendor_id,
			product_id,
		})
	}

	pub fn size(&self) -> SizeClass {
		self.size
	}

	pub fn serial(&self) -> &str {
		&self.serial
	}

	pub fn product(&self) -> &str {
		&self.product
	}

	/// Serialize to the raw image handed to the programmer.
	///
	/// The image is one byte shorter than the EEPROM; unset bytes stay zero.
	pub fn build(&self) -> Vec<u8> {
		let mut rom = vec![0u8; self.size.size_bytes() - 1];
		rom[0] = SYNC_BYTE;
		rom[1] = self.mode;
		rom[2] = self.config;
		// rom[3] reserved
		rom[4] = self.vendor_id.0 as u8;
		rom[5] = (self.vendor_id.0 >> 8) as u8;
		rom[6] = self.product_id.0 as u8;
		rom[7] = (self.product_id.0 >> 8) as u8;
		rom[8] = self.minor_version;
		rom[9] = self.major_version;
		// rom[10..16] reserved
		rom[SERIAL_OFFSET..SERIAL_OFFSET + SERIAL_LEN].copy_from_slice(self.serial.as_bytes());
		// rom[24..32] reserved
		rom[PRODUCT_OFFSET..PRODUCT_OFFSET + self.product.len()].copy_from_slice(self.product.as_bytes());
		rom
	}
}

impl fmt::Display for EepromImage {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"EEPROM: {}.{} {} {}",
			self.major_version,
			self.minor_version,
			self.serial,
			self.product,
		)
	}
}
