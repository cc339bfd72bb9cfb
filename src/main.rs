//! Gigabyte Aero keyboard RGB CLI tool.

use std::error::Error;
use std::ffi::CString;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::process;

use clap::builder::EnumValueParser;
use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use aerorgb::controller::{INTERFACE, PRODUCT_ID, VENDOR_ID};
use aerorgb::transport::CHUNK_SIZE;
use aerorgb::{AeroKeyboard, Color, CustomBuffer, Mode, PresetSpec, Rgb};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "aerorgb=warn";

/// Device selection.
#[derive(PartialEq, Eq, Debug)]
struct DeviceConfig {
    path: Option<String>,
    vendor_id: u16,
    product_id: u16,
    chunk_size: usize,
}

impl DeviceConfig {
    fn from_cli(matches: &ArgMatches) -> Self {
        let mut config = DeviceConfig::default();

        config.path = matches.get_one::<String>("path").cloned();
        replace_from_cli(&mut config.vendor_id, matches, "vendor-id");
        replace_from_cli(&mut config.product_id, matches, "product-id");
        replace_from_cli(&mut config.chunk_size, matches, "chunk-size");

        config
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { path: None, vendor_id: VENDOR_ID, product_id: PRODUCT_ID, chunk_size: CHUNK_SIZE }
    }
}

fn main() {
    init_logging();

    let matches = cli();
    if let Err(err) = run(&matches) {
        eprintln!("\x1b[31mError:\x1b[0m {err}");
        process::exit(1);
    }
}

/// Install the log subscriber, filtered by `RUST_LOG`.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Dispatch the selected subcommand.
fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = DeviceConfig::from_cli(matches);

    match matches.subcommand() {
        Some(("preset", matches)) => {
            let preset = preset_from_cli(matches);

            // Reject invalid values before touching the device.
            preset.validate()?;

            keyboard(&config)?.set_preset(&preset)?;
        },
        Some(("custom", matches)) => {
            let path = required::<PathBuf>(matches, "file")?;
            let data = fs::read(path)
                .map_err(|err| format!("unable to read {}: {err}", path.display()))?;
            let buffer = CustomBuffer::from_bytes(data)?;

            keyboard(&config)?.set_custom(&buffer)?;
        },
        Some(("keys", matches)) => {
            let colors = matches
                .get_many::<String>("colors")
                .into_iter()
                .flatten()
                .map(|arg| parse_key_color(arg))
                .collect::<Result<Vec<_>, _>>()?;
            let buffer =
                aerorgb::encode_named(colors.iter().map(|(key, rgb)| (key.as_str(), *rgb)))?;

            // Store the buffer for later use with `custom`.
            if let Some(output) = matches.get_one::<PathBuf>("output") {
                fs::write(output, buffer.bytes())
                    .map_err(|err| format!("unable to write {}: {err}", output.display()))?;
                println!("\x1b[32mColor map written to {}.\x1b[0m", output.display());
                return Ok(());
            }

            keyboard(&config)?.set_custom(&buffer)?;
        },
        _ => unreachable!("subcommand required"),
    }

    println!("\x1b[32mSuccessfully applied changes.\x1b[0m");

    Ok(())
}

/// Open the keyboard's lighting controller.
fn keyboard(config: &DeviceConfig) -> Result<AeroKeyboard<HidDevice>, Box<dyn Error>> {
    let api = HidApi::new().map_err(|err| format!("unable to access HID: {err}"))?;

    let device = match &config.path {
        Some(path) => {
            debug!("Opening {path}");
            api.open_path(&CString::new(path.as_str())?)
        },
        None => {
            let info = api
                .device_list()
                .find(|info| {
                    info.vendor_id() == config.vendor_id
                        && info.product_id() == config.product_id
                        && info.interface_number() == INTERFACE
                })
                .ok_or_else(|| {
                    format!(
                        "device {:04x}:{:04x} interface {INTERFACE} not found",
                        config.vendor_id, config.product_id
                    )
                })?;

            debug!("Opening {:?}", info.path());
            info.open_device(&api)
        },
    };

    let device = match device {
        Ok(device) => device,
        Err(err) => {
            return Err(format!("unable to open device: {err} (root permissions required)").into())
        },
    };

    info!("Opened {:04x}:{:04x}", config.vendor_id, config.product_id);

    Ok(AeroKeyboard::with_chunk_size(device, config.chunk_size)?)
}

/// Read the preset subcommand's parameters.
fn preset_from_cli(matches: &ArgMatches) -> PresetSpec {
    let mut preset = PresetSpec::default();

    replace_from_cli(&mut preset.mode, matches, "mode");
    replace_from_cli(&mut preset.color, matches, "color");
    replace_from_cli(&mut preset.speed, matches, "speed");
    replace_from_cli(&mut preset.brightness, matches, "brightness");

    preset
}

/// Parse a `KEY=COLOR` argument.
fn parse_key_color(arg: &str) -> Result<(String, Rgb), Box<dyn Error>> {
    // Split at the last `=`, since `=` is also a key name.
    let (key, color) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("invalid key color {arg:?}, expected KEY=RRGGBB"))?;

    Ok((key.to_string(), color.parse()?))
}

/// Parse a hexadecimal ID, with or without `0x` prefix.
fn parse_hex_u16(s: &str) -> Result<u16, ParseIntError> {
    u16::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16)
}

/// Replace config value with the CLI parameter if it is present.
#[inline]
fn replace_from_cli<T>(option: &mut T, matches: &ArgMatches, name: &str)
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(value) = matches.get_one::<T>(name) {
        *option = value.clone();
    }
}

/// Get a required CLI parameter.
#[inline]
fn required<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<&'a T, Box<dyn Error>>
where
    T: Clone + Send + Sync + 'static,
{
    matches.get_one::<T>(name).ok_or_else(|| format!("missing argument: {name}").into())
}

/// Get clap CLI parameters.
fn cli() -> ArgMatches {
    command().get_matches()
}

fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author("Christian Duerr <contact@christianduerr.com>")
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path of the hidraw device node")
                .long("path")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new("vendor-id")
                .help("HID vendor ID [default: 1044]")
                .long("vendor-id")
                .global(true)
                .value_parser(parse_hex_u16),
        )
        .arg(
            Arg::new("product-id")
                .help("HID product ID [default: 7a3b]")
                .long("product-id")
                .global(true)
                .value_parser(parse_hex_u16),
        )
        .arg(
            Arg::new("chunk-size")
                .help("Output report size used for custom colors [default: 64]")
                .long("chunk-size")
                .global(true)
                .value_parser(value_parser!(usize)),
        )
        .subcommand(
            Command::new("preset")
                .about("Activate a built-in lighting effect")
                .arg(
                    Arg::new("mode")
                        .help("Lighting effect")
                        .long("mode")
                        .short('m')
                        .required(true)
                        .ignore_case(true)
                        .value_parser(EnumValueParser::<Mode>::new()),
                )
                .arg(
                    Arg::new("speed")
                        .help("Effect speed, 1 being the fastest [possible values: 0..=10]")
                        .long("speed")
                        .short('s')
                        .value_parser(value_parser!(u8)),
                )
                .arg(
                    Arg::new("brightness")
                        .help("Brightness [possible values: 0..=51]")
                        .long("brightness")
                        .short('b')
                        .value_parser(value_parser!(u8)),
                )
                .arg(
                    Arg::new("color")
                        .help("Effect color")
                        .long("color")
                        .short('c')
                        .ignore_case(true)
                        .value_parser(EnumValueParser::<Color>::new()),
                ),
        )
        .subcommand(
            Command::new("custom").about("Upload a 512 byte per-key color file").arg(
                Arg::new("file")
                    .help("Color buffer file")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            ),
        )
        .subcommand(
            Command::new("keys")
                .about("Set individual key colors, turning all other keys off")
                .arg(
                    Arg::new("colors")
                        .help("Key colors [format: KEY=RRGGBB]")
                        .value_name("KEY=COLOR")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output")
                        .help("Write the color buffer to a file instead of the device")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        command().try_get_matches_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn cli_is_valid() {
        command().debug_assert();
    }

    #[test]
    fn preset_defaults() {
        let matches = matches(&["aerorgb", "preset", "--mode", "breathing"]);
        let (_, preset_matches) = matches.subcommand().unwrap();

        assert_eq!(preset_from_cli(preset_matches), PresetSpec::new(Mode::Breathing));
        assert_eq!(DeviceConfig::from_cli(&matches), DeviceConfig::default());
    }

    #[test]
    fn preset_parameters() {
        let matches = matches(&[
            "aerorgb",
            "--vendor-id",
            "0x1234",
            "preset",
            "-m",
            "fade-on-keypress",
            "-s",
            "3",
            "-b",
            "51",
            "-c",
            "Blue",
        ]);
        let (_, preset_matches) = matches.subcommand().unwrap();

        let expected =
            PresetSpec { mode: Mode::FadeOnKeypress, color: Color::Blue, speed: 3, brightness: 51 };
        assert_eq!(preset_from_cli(preset_matches), expected);
        assert_eq!(DeviceConfig::from_cli(&matches).vendor_id, 0x1234);
    }

    #[test]
    fn out_of_range_preset_is_rejected() {
        let matches = matches(&["aerorgb", "preset", "-m", "static", "-b", "52"]);
        let (_, preset_matches) = matches.subcommand().unwrap();

        assert!(preset_from_cli(preset_matches).validate().is_err());
    }

    #[test]
    fn wave_is_not_offered() {
        assert!(command().try_get_matches_from(["aerorgb", "preset", "-m", "wave"]).is_err());
    }

    #[test]
    fn key_color_arguments() {
        assert_eq!(parse_key_color("esc=#ff0000").unwrap(), ("esc".into(), Rgb::new(0xff, 0, 0)));
        assert_eq!(parse_key_color("==00ff00").unwrap(), ("=".into(), Rgb::new(0, 0xff, 0)));
        assert!(parse_key_color("esc").is_err());
        assert!(parse_key_color("esc=red").is_err());
    }

    #[test]
    fn keys_accepts_multiple_colors() {
        let matches = matches(&["aerorgb", "keys", "esc=#ff0000", "a=00ff00", "-o", "map.bin"]);
        let (_, keys_matches) = matches.subcommand().unwrap();

        let colors: Vec<_> = keys_matches.get_many::<String>("colors").unwrap().collect();
        assert_eq!(colors, ["esc=#ff0000", "a=00ff00"]);
        assert_eq!(keys_matches.get_one::<PathBuf>("output").unwrap(), &PathBuf::from("map.bin"));
    }

    #[test]
    fn hex_ids() {
        assert_eq!(parse_hex_u16("0x1044").unwrap(), 0x1044);
        assert_eq!(parse_hex_u16("7a3b").unwrap(), 0x7a3b);
        assert!(parse_hex_u16("0xfffff").is_err());
    }
}
