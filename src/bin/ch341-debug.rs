#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate ch341_eeprom_factory;
use ch341_eeprom_factory::*;

use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::process::exit;

use ch341_eeprom_factory::eeprom::{
	self,
	EepromImage,
	SizeClass,
};
use ch341_eeprom_factory::programmer::{
	Ch341EepromTool,
	Programmer,
};

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

fn image_from_matches(sub_m: &clap::ArgMatches) -> AResult<EepromImage> {
	let serial: u32 = get_param(sub_m, "serial", 13374204)?;
	let image = EepromImage::new(
		get_param(sub_m, "size", SizeClass::Kbit2)?,
		get_param(sub_m, "major", 1)?,
		get_param(sub_m, "minor", 2)?,
		&serial.to_string(),
		sub_m.value_of("product").unwrap_or("MESHTOAD"),
	)?;
	Ok(image)
}

fn image(sub_m: &clap::ArgMatches) -> AResult<()> {
	let rom = image_from_matches(sub_m)?.build();

	if sub_m.is_present("hex") {
		let mut out = String::with_capacity(2 * rom.len());
		for b in &rom {
			out.push_str(&format!("{:02x}", b));
		}
		println!("{}", out);
	} else {
		io::stdout().write_all(&rom)?;
	}

	Ok(())
}

fn decode(sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = match sub_m.value_of("FILE") {
		Some(p) => p,
		None => bail!("missing parameter FILE"),
	};

	let mut data = Vec::new();
	fs::File::open(path)?.read_to_end(&mut data)?;
	println!("{:#?}", eeprom::decode(&data)?);

	Ok(())
}

fn dump_eeprom(sub_m: &clap::ArgMatches) -> AResult<()> {
	let size = get_param(sub_m, "size", SizeClass::Kbit2)?;
	let bin = sub_m.value_of("bin").unwrap_or("ch341eeprom");

	let mut tool = Ch341EepromTool::new(bin, size);
	let data = tool.read()?;
	if data.len() != size.size_bytes() {
		warn!("read {} bytes, expected {}", data.len(), size.size_bytes());
	}
	io::stdout().write_all(&data)?;

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand image =>
			(about: "build a configuration image and write it to stdout")
			(@arg hex: --hex "print a hex string instead of raw bytes")
			(@arg serial: --serial +takes_value "Serial number (8 digits, default 13374204)")
			(@arg product: --product +takes_value "Product name (default MESHTOAD)")
			(@arg major: --("major-version") +takes_value "Major version number (default 1)")
			(@arg minor: --("minor-version") +takes_value "Minor version number (default 2)")
			(@arg size: --size +takes_value "EEPROM size class (default 24c02)")
		)
		(@subcommand decode =>
			(about: "decode a configuration image file")
			(@arg FILE: +required "image file to decode")
		)
		(@subcommand dump_eeprom =>
			(about: "read the device EEPROM and write the raw contents to stdout")
			(@arg size: --size +takes_value "EEPROM size class (default 24c02)")
			(@arg bin: --bin +takes_value "Path to the ch341eeprom binary (default: ch341eeprom in PATH)")
		)
	).get_matches();

	match matches.subcommand() {
		("image", Some(sub_m)) => {
			image(sub_m)
		}
		("decode", Some(sub_m)) => {
			decode(sub_m)
		}
		("dump_eeprom", Some(sub_m)) => {
			dump_eeprom(sub_m)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
