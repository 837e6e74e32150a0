#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate ch341_eeprom_factory;
use ch341_eeprom_factory::*;

use std::io;
use std::process::exit;

use ch341_eeprom_factory::batch::{
	run_batch,
	BatchSettings,
};
use ch341_eeprom_factory::eeprom::SizeClass;
use ch341_eeprom_factory::programmer::Ch341EepromTool;

fn get_param<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(default),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg serial: --serial +takes_value "Starting serial number (8 digits, default 13374204)")
		(@arg product: --product +takes_value "Product name (default MESHTOAD)")
		(@arg major: --("major-version") +takes_value "Major version number (default 1)")
		(@arg minor: --("minor-version") +takes_value "Minor version number (default 2)")
		(@arg size: --size +takes_value "EEPROM size class (default 24c02)")
		(@arg bin: --bin +takes_value "Path to the ch341eeprom binary (default: ch341eeprom in PATH)")
	).get_matches();

	let settings = BatchSettings {
		start_serial: get_param(&matches, "serial", 13374204)?,
		product: matches.value_of("product").unwrap_or("MESHTOAD").to_string(),
		major_version: get_param(&matches, "major", 1)?,
		minor_version: get_param(&matches, "minor", 2)?,
		size: get_param(&matches, "size", SizeClass::Kbit2)?,
	};
	ensure!(
		settings.start_serial.to_string().len() == 8,
		"starting serial must have 8 digits: {}", settings.start_serial
	);

	let bin = matches.value_of("bin").unwrap_or("ch341eeprom");
	let mut tool = Ch341EepromTool::new(bin, settings.size);

	let stdin = io::stdin();
	run_batch(&mut tool, &settings, stdin.lock(), io::stdout())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
