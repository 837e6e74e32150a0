use std::str;

use super::{
	ProductId,
	VendorId,
	SYNC_BYTE,
};

/// Fields recovered from a built or read-back configuration image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImageFields {
	pub mode: u8,
	pub config: u8,
	pub vendor_id: VendorId,
	pub product_id: ProductId,
	pub major_version: u8,
	pub minor_version: u8,
	pub serial: String,
	pub product: String,
}

pub fn decode(image: &[u8]) -> crate::AResult<ImageFields> {
	ensure!(image.len() >= 32, "image too short: {} bytes", image.len());
	ensure!(
		image[0] == SYNC_BYTE,
		"invalid sync marker: 0x{:02x} (expected 0x{:02x})", image[0], SYNC_BYTE
	);

	if image[3] != 0
		|| image[10..16].iter().any(|&b| b != 0)
		|| image[24..32].iter().any(|&b| b != 0)
	{
		warn!("reserved bytes are not zero, image was probably not built by this tool");
	}

	let serial = match str::from_utf8(&image[16..24]) {
		Ok(s) if s.is_ascii() => s,
		_ => bail!("serial bytes are not ASCII: {:?}", &image[16..24]),
	};

	let product_bytes = &image[32..];
	let product_bytes = match product_bytes.iter().position(|&b| b == 0) {
		Some(end) => &product_bytes[..end],
		None => product_bytes,
	};
	ensure!(product_bytes.len() < 95, "product string not terminated within 94 bytes");
	let product = match str::from_utf8(product_bytes) {
		Ok(s) if s.is_ascii() => s,
		_ => bail!("product bytes are not ASCII: {:?}", product_bytes),
	};

	Ok(ImageFields {
		mode: image[1],
		config: image[2],
		vendor_id: VendorId((image[4] as u16) | ((image[5] as u16) << 8)),
		product_id: ProductId((image[6] as u16) | ((image[7] as u16) << 8)),
		major_version: image[9],
		minor_version: image[8],
		serial: serial.into(),
		product: product.into(),
	})
}
