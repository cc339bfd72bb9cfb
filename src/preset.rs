//! Built-in lighting effects.

use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;

use bytes::{BufMut, Bytes, BytesMut};
use clap::ValueEnum;

use crate::error::{Error, Result};

/// Size of a feature report, excluding the report ID.
pub const REPORT_SIZE: usize = 8;

/// Valid effect speeds, `1` being the fastest.
pub const SPEED_RANGE: RangeInclusive<u8> = 0..=10;

/// Valid brightness levels.
pub const BRIGHTNESS_RANGE: RangeInclusive<u8> = 0..=51;

/// Feature report command.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u8)]
pub enum Kind {
    Preset = 0x08,
    CustomConfig = 0x12,
}

/// Lighting effect.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Static = 1,
    Breathing = 2,
    // Wave (3) is not listed, the firmware renders it incorrectly.
    #[value(alias = "fade_on_keypress")]
    FadeOnKeypress = 4,
    Marquee = 5,
    Ripple = 6,
    #[value(alias = "flash_on_keypress")]
    FlashOnKeypress = 7,
    Neon = 8,
    #[value(alias = "rainbow_marquee")]
    RainbowMarquee = 9,
    Raindrop = 10,
    #[value(alias = "circle_marquee")]
    CircleMarquee = 11,
    Hedge = 12,
    Rotate = 13,
    /// Show the uploaded per-key colors.
    Custom = 0x34,
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::value_variants()
            .iter()
            .copied()
            .find(|mode| *mode as u8 == value)
            .ok_or_else(|| Error::invalid_parameter("mode", value))
    }
}

/// Preset effect color.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Orange = 5,
    Purple = 6,
    #[default]
    White = 7,
}

impl TryFrom<u8> for Color {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::value_variants()
            .iter()
            .copied()
            .find(|color| *color as u8 == value)
            .ok_or_else(|| Error::invalid_parameter("color", value))
    }
}

/// Raw feature report understood by the controller.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct FeatureReport {
    pub kind: Kind,
    pub mode: Mode,
    pub speed: u8,
    pub brightness: u8,
    pub color: Color,
    /// Set when committing an uploaded custom map.
    pub commit: bool,
}

impl FeatureReport {
    /// Complement of the sum over all fields.
    pub fn checksum(&self) -> u8 {
        let sum = [
            self.kind as u8,
            self.mode as u8,
            self.speed,
            self.brightness,
            self.color as u8,
            self.commit as u8,
        ]
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte));

        0xff - sum
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(REPORT_SIZE);

        buf.put_u8(self.kind as u8);

        // Reserved.
        buf.put_u8(0);

        buf.put_u8(self.mode as u8);
        buf.put_u8(self.speed);
        buf.put_u8(self.brightness);
        buf.put_u8(self.color as u8);
        buf.put_u8(self.commit as u8);
        buf.put_u8(self.checksum());

        buf.freeze()
    }
}

/// Built-in effect configuration.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct PresetSpec {
    pub mode: Mode,
    pub color: Color,
    pub speed: u8,
    pub brightness: u8,
}

impl PresetSpec {
    /// Preset with default speed, brightness and color.
    pub fn new(mode: Mode) -> Self {
        Self { mode, ..Default::default() }
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !SPEED_RANGE.contains(&self.speed) {
            return Err(Error::invalid_parameter("speed", self.speed));
        }

        if !BRIGHTNESS_RANGE.contains(&self.brightness) {
            return Err(Error::invalid_parameter("brightness", self.brightness));
        }

        Ok(())
    }

    /// Convert to the controller's report format.
    pub fn encode(&self) -> Result<Bytes> {
        self.validate()?;

        let report = FeatureReport {
            kind: Kind::Preset,
            mode: self.mode,
            speed: self.speed,
            brightness: self.brightness,
            color: self.color,
            commit: false,
        };

        Ok(report.to_bytes())
    }
}

impl Default for PresetSpec {
    fn default() -> Self {
        Self { mode: Mode::default(), color: Color::default(), speed: 0, brightness: 20 }
    }
}

impl Display for PresetSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} (color: {:?}, speed: {}, brightness: {})",
            self.mode, self.color, self.speed, self.brightness
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_white() {
        let spec = PresetSpec::new(Mode::Static);
        let sum: u32 = 0x08 + 0x01 + 20 + 7;
        let checksum = 0xff - sum as u8;
        assert_eq!(&spec.encode().unwrap()[..], &[0x08, 0, 0x01, 0, 20, 7, 0, checksum]);
    }

    #[test]
    fn checksum_wraps() {
        let report = FeatureReport {
            kind: Kind::Preset,
            mode: Mode::Custom,
            speed: 200,
            brightness: 100,
            color: Color::White,
            commit: true,
        };

        // 0x08 + 0x34 + 200 + 100 + 7 + 1 = 0x170
        assert_eq!(report.checksum(), 0x8f);

        let bytes = report.to_bytes();
        assert_eq!(bytes.len(), REPORT_SIZE);
        let total = bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte));
        assert_eq!(total, 0xff);
    }

    #[test]
    fn encoding_is_deterministic() {
        let spec =
            PresetSpec { mode: Mode::Ripple, color: Color::Purple, speed: 3, brightness: 40 };
        assert_eq!(spec.encode().unwrap(), spec.encode().unwrap());
        assert_eq!(spec.encode().unwrap(), PresetSpec { ..spec }.encode().unwrap());
    }

    #[test]
    fn range_limits_are_inclusive() {
        let spec = PresetSpec { speed: 10, brightness: 51, ..PresetSpec::new(Mode::Neon) };
        assert!(spec.encode().is_ok());

        let spec = PresetSpec { speed: 0, brightness: 0, ..PresetSpec::new(Mode::Neon) };
        assert!(spec.encode().is_ok());
    }

    #[test]
    fn invalid_speed() {
        let spec = PresetSpec { speed: 11, ..PresetSpec::new(Mode::Breathing) };
        let err = spec.encode().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { field: "speed", ref value } if value == "11"));
    }

    #[test]
    fn invalid_brightness() {
        let spec = PresetSpec { brightness: 52, ..PresetSpec::new(Mode::Breathing) };
        let err = spec.encode().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { field: "brightness", .. }));
        assert_eq!(err.to_string(), "invalid brightness: 52");
    }

    #[test]
    fn raw_enum_values() {
        assert_eq!(Mode::try_from(0x34).unwrap(), Mode::Custom);
        assert_eq!(Mode::try_from(13).unwrap(), Mode::Rotate);
        assert_eq!(Color::try_from(5).unwrap(), Color::Orange);

        for invalid in [0, 3, 14, 0x33] {
            let err = Mode::try_from(invalid).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { field: "mode", .. }));
        }
        assert!(matches!(Color::try_from(8), Err(Error::InvalidParameter { field: "color", .. })));
    }

    #[test]
    fn cli_names() {
        assert_eq!(Mode::from_str("fade-on-keypress", true).unwrap(), Mode::FadeOnKeypress);
        assert_eq!(Mode::from_str("rainbow_marquee", true).unwrap(), Mode::RainbowMarquee);
        assert_eq!(Color::from_str("Purple", true).unwrap(), Color::Purple);
        assert!(Mode::from_str("wave", true).is_err());
    }
}
