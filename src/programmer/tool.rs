use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::path::PathBuf;
use std::process::{
	Command,
	ExitStatus,
};

use crate::eeprom::SizeClass;
use crate::AResult;

use super::{
	ExternalToolError,
	Programmer,
};

const READ_FILE: &str = "read_eeprom.bin";
const WRITE_FILE: &str = "write_eeprom.bin";
const VERIFY_FILE: &str = "verify_eeprom.bin";

pub struct Ch341EepromTool {
	bin: PathBuf,
	size: SizeClass,
}

impl Ch341EepromTool {
	pub fn new<P: Into<PathBuf>>(bin: P, size: SizeClass) -> Ch341EepromTool {
		Ch341EepromTool {
			bin: bin.into(),
			size,
		}
	}

	fn command(&self, flag: &str, file: Option<&str>) -> Command {
		let mut cmd = Command::new(&self.bin);
		cmd.arg(flag);
		if let Some(file) = file {
			cmd.arg(file);
		}
		cmd.arg("--size").arg(self.size.as_str());
		cmd
	}
}

fn check_status(operation: &'static str, status: ExitStatus) -> Result<(), ExternalToolError> {
	if status.success() {
		Ok(())
	} else {
		Err(ExternalToolError {
			operation,
			status,
		})
	}
}

// a crashed earlier run may have left the file behind
fn remove_stale(path: &str) -> io::Result<()> {
	match fs::remove_file(path) {
		Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
		r => r,
	}
}

impl Programmer for Ch341EepromTool {
	fn erase(&mut self) -> AResult<()> {
		with_context!("erase EEPROM", {
			let mut cmd = self.command("--erase", None);
			debug!("running {:?}", cmd);
			check_status("erase", cmd.status()?)?;
			Ok(())
		})
	}

	fn read(&mut self) -> AResult<Vec<u8>> {
		with_context!("read EEPROM", {
			remove_stale(READ_FILE)?;
			let mut cmd = self.command("--read", Some(READ_FILE));
			debug!("running {:?}", cmd);
			// the tool is chatty on stdout; keep it out of the contents dump
			let output = cmd.output()?;
			if let Err(e) = check_status("read", output.status) {
				warn!("{}", String::from_utf8_lossy(&output.stderr));
				return Err(e.into());
			}

			let mut data = Vec::new();
			fs::File::open(READ_FILE)?.read_to_end(&mut data)?;
			fs::remove_file(READ_FILE)?;
			Ok(data)
		})
	}

	fn write(&mut self, image: &[u8]) -> AResult<()> {
		with_context!("write EEPROM", {
			remove_stale(WRITE_FILE)?;
			fs::File::create(WRITE_FILE)?.write_all(image)?;
			let mut cmd = self.command("--write", Some(WRITE_FILE));
			debug!("running {:?}", cmd);
			check_status("write", cmd.status()?)?;
			fs::remove_file(WRITE_FILE)?;
			Ok(())
		})
	}

	fn verify(&mut self, image: &[u8]) -> AResult<()> {
		with_context!("verify EEPROM", {
			remove_stale(VERIFY_FILE)?;
			fs::File::create(VERIFY_FILE)?.write_all(image)?;
			let mut cmd = self.command("--verify", Some(VERIFY_FILE));
			debug!("running {:?}", cmd);
			check_status("verify", cmd.status()?)?;
			fs::remove_file(VERIFY_FILE)?;
			Ok(())
		})
	}
}
