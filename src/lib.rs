//! Gigabyte Aero keyboard RGB control.
//!
//! Lighting commands are encoded into HID reports and written to an already
//! opened device channel. Built-in effects are a single feature report, while
//! per-key colors are uploaded as a 512 byte buffer split into output reports.

pub mod controller;
pub mod custom;
pub mod error;
pub mod layout;
pub mod preset;
pub mod transport;

pub use crate::controller::AeroKeyboard;
pub use crate::custom::{
    decode_color_map, encode_color_map, encode_named, ColorMap, CustomBuffer, Rgb,
};
pub use crate::error::{Error, Result};
pub use crate::layout::{offset_of, KeyName};
pub use crate::preset::{Color, Mode, PresetSpec};
pub use crate::transport::{HidChannel, Report, Transmission, TransmissionState};
