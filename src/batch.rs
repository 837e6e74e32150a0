//! Serialization batch: program one device after another, prompting the
//! operator and incrementing the serial number between units.

use std::io::{
	self,
	BufRead,
	Write,
};

use failure::Fail;

use crate::eeprom::{
	EepromImage,
	SizeClass,
};
use crate::programmer::Programmer;
use crate::AResult;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
#[fail(display = "EEPROM read returned {} bytes, expected {}", actual, expected)]
pub struct ReadSizeMismatch {
	pub expected: usize,
	pub actual: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BatchSettings {
	pub start_serial: u32,
	pub product: String,
	pub major_version: u8,
	pub minor_version: u8,
	pub size: SizeClass,
}

/// Program devices in sequence until the operator stops feeding input.
///
/// The serial counter lives here and only here; it advances after a unit
/// completes, and any failure aborts the whole batch. The operator restarts
/// with the same `--serial` to retry a unit.
pub fn run_batch<P, R, W>(
	programmer: &mut P,
	settings: &BatchSettings,
	mut input: R,
	mut output: W,
) -> AResult<()>
where
	P: Programmer,
	R: BufRead,
	W: Write,
{
	let mut serial = settings.start_serial;
	loop {
		write!(output, "Attach serial number: {}", serial)?;
		output.flush()?;
		let mut line = String::new();
		if input.read_line(&mut line)? == 0 {
			info!("end of input, batch stopped before serial {}", serial);
			return Ok(());
		}

		program_one(programmer, settings, serial, &mut output)?;
		serial += 1;
	}
}

fn program_one<P, W>(
	programmer: &mut P,
	settings: &BatchSettings,
	serial: u32,
	output: &mut W,
) -> AResult<()>
where
	P: Programmer,
	W: Write,
{
	with_context!(("unit {}", serial), {
		let image = EepromImage::new(
			settings.size,
			settings.major_version,
			settings.minor_version,
			&serial.to_string(),
			&settings.product,
		)?;

		// guards against misdetected or absent hardware before touching it
		let expected = settings.size.size_bytes();
		let initial = programmer.read()?;
		if initial.len() != expected {
			return Err(ReadSizeMismatch {
				expected,
				actual: initial.len(),
			}.into());
		}

		programmer.erase()?;
		let rom = image.build();
		programmer.write(&rom)?;
		programmer.verify(&rom)?;
		info!("flashed {}", image);

		let contents = programmer.read()?;
		writeln!(output, "New EEPROM contents:")?;
		hexdump(output, &contents[..contents.len().min(127)])?;
		writeln!(output)?;

		Ok(())
	})
}

fn hexdump<W: Write>(output: &mut W, data: &[u8]) -> io::Result<()> {
	for i in 0..data.len() {
		if 0 == i % 16 {
			write!(output, "{:08x} ", i)?;
		} else if 0 == i % 8 {
			write!(output, " ")?;
		}
		write!(output, " {:02x}", data[i])?;
		if 15 == i % 16 {
			writeln!(output)?;
		}
	}
	if 0 != data.len() % 16 {
		writeln!(output)?;
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::{
		run_batch,
		BatchSettings,
		ReadSizeMismatch,
	};
	use crate::eeprom::SizeClass;
	use crate::programmer::Programmer;
	use crate::AResult;

	struct MockProgrammer {
		read_len: usize,
		fail_op: Option<&'static str>,
		ops: Vec<&'static str>,
		written: Vec<Vec<u8>>,
	}

	impl MockProgrammer {
		fn new() -> MockProgrammer {
			MockProgrammer {
				read_len: SizeClass::Kbit2.size_bytes(),
				fail_op: None,
				ops: Vec::new(),
				written: Vec::new(),
			}
		}

		fn record(&mut self, op: &'static str) -> AResult<()> {
			self.ops.push(op);
			if self.fail_op == Some(op) {
				bail!("mock {} failure", op);
			}
			Ok(())
		}
	}

	impl Programmer for MockProgrammer {
		fn erase(&mut self) -> AResult<()> {
			self.record("erase")
		}

		fn read(&mut self) -> AResult<Vec<u8>> {
			self.record("read")?;
			Ok(vec![0xff; self.read_len])
		}

		fn write(&mut self, image: &[u8]) -> AResult<()> {
			self.record("write")?;
			self.written.push(image.to_vec());
			Ok(())
		}

		fn verify(&mut self, image: &[u8]) -> AResult<()> {
			self.record("verify")?;
			assert_eq!(Some(image), self.written.last().map(|v| &v[..]));
			Ok(())
		}
	}

	fn settings() -> BatchSettings {
		BatchSettings {
			start_serial: 13374204,
			product: "MESHTOAD".to_string(),
			major_version: 1,
			minor_version: 2,
			size: SizeClass::Kbit2,
		}
	}

	#[test]
	fn programs_units_until_end_of_input() {
		let mut mock = MockProgrammer::new();
		let mut console = Vec::new();
		run_batch(&mut mock, &settings(), &b"\n\n"[..], &mut console).unwrap();

		let unit_ops = ["read", "erase", "write", "verify", "read"];
		let expected: Vec<&str> = unit_ops.iter().chain(unit_ops.iter()).cloned().collect();
		assert_eq!(mock.ops, expected);

		// serial advanced between the two written images
		assert_eq!(mock.written.len(), 2);
		assert_eq!(&mock.written[0][16..24], b"13374204");
		assert_eq!(&mock.written[1][16..24], b"13374205");

		let console = String::from_utf8(console).unwrap();
		assert!(console.contains("Attach serial number: 13374204"));
		assert!(console.contains("Attach serial number: 13374205"));
		// the prompt for the unit that never arrived
		assert!(console.contains("Attach serial number: 13374206"));
		assert!(console.contains("New EEPROM contents:"));
	}

	#[test]
	fn short_read_aborts_before_erase() {
		let mut mock = MockProgrammer::new();
		mock.read_len = 128;
		let err = run_batch(&mut mock, &settings(), &b"\n"[..], Vec::new()).unwrap_err();

		match err.find_root_cause().downcast_ref::<ReadSizeMismatch>() {
			Some(e) => {
				assert_eq!(e.expected, 256);
				assert_eq!(e.actual, 128);
			}
			None => panic!("expected ReadSizeMismatch, got: {}", err),
		}
		assert!(err.to_string().starts_with("unit 13374204"), "unexpected error: {}", err);
		assert_eq!(mock.ops, ["read"]);
	}

	#[test]
	fn tool_failure_aborts_the_batch() {
		let mut mock = MockProgrammer::new();
		mock.fail_op = Some("erase");
		let err = run_batch(&mut mock, &settings(), &b"\n\n"[..], Vec::new()).unwrap_err();

		assert!(err.to_string().starts_with("unit 13374204"), "unexpected error: {}", err);
		// nothing written, no second unit started
		assert_eq!(mock.ops, ["read", "erase"]);
		assert!(mock.written.is_empty());
	}

	#[test]
	fn verify_failure_aborts_after_write() {
		let mut mock = MockProgrammer::new();
		mock.fail_op = Some("verify");
		let err = run_batch(&mut mock, &settings(), &b"\n"[..], Vec::new()).unwrap_err();

		assert!(err.to_string().starts_with("unit 13374204"), "unexpected error: {}", err);
		assert_eq!(mock.ops, ["read", "erase", "write", "verify"]);
	}

	#[test]
	fn serial_outgrowing_eight_digits_aborts() {
		let mut mock = MockProgrammer::new();
		let mut batch = settings();
		batch.start_serial = 99999999;
		let err = run_batch(&mut mock, &batch, &b"\n\n"[..], Vec::new()).unwrap_err();

		// first unit flashes, the 9-digit successor is rejected
		assert_eq!(mock.written.len(), 1);
		assert!(err.to_string().starts_with("unit 100000000"), "unexpected error: {}", err);
	}
}
