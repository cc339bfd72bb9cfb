//! Keyboard RGB controller.

use bytes::Bytes;
use tracing::info;

use crate::custom::{self, ColorMap, CustomBuffer};
use crate::error::Result;
use crate::preset::{Color, FeatureReport, Kind, Mode, PresetSpec};
use crate::transport::{self, HidChannel, Report, Transmission, CHUNK_SIZE};

/// HID vendor ID.
pub const VENDOR_ID: u16 = 0x1044;

/// HID product ID.
pub const PRODUCT_ID: u16 = 0x7a3b;

/// HID interface of the lighting controller.
pub const INTERFACE: i32 = 3;

/// Gigabyte Aero keyboard lighting controller.
pub struct AeroKeyboard<C> {
    channel: C,
    chunk_size: usize,
}

impl<C: HidChannel> AeroKeyboard<C> {
    pub fn new(channel: C) -> Self {
        Self { channel, chunk_size: CHUNK_SIZE }
    }

    /// Controller accepting custom maps in reports of `chunk_size` bytes.
    pub fn with_chunk_size(channel: C, chunk_size: usize) -> Result<Self> {
        transport::validate_chunk_size(chunk_size)?;
        Ok(Self { channel, chunk_size })
    }

    /// Activate a built-in effect.
    pub fn set_preset(&mut self, preset: &PresetSpec) -> Result<()> {
        let report = preset.encode()?;

        info!("Setting preset {preset}");
        Transmission::new(vec![Report::Feature(report)]).run(&mut self.channel)
    }

    /// Upload and activate per-key colors.
    pub fn set_custom(&mut self, buffer: &CustomBuffer) -> Result<()> {
        let mut transmission = self.custom_transmission(buffer)?;

        info!("Uploading custom colors in {} reports", transmission.reports().len());
        transmission.run(&mut self.channel)
    }

    /// Upload and activate a pre-built per-key color buffer.
    pub fn set_custom_bytes(&mut self, bytes: impl Into<Bytes>) -> Result<()> {
        let buffer = CustomBuffer::from_bytes(bytes)?;
        self.set_custom(&buffer)
    }

    /// Upload and activate colors for individual keys, turning all others off.
    pub fn set_color_map(&mut self, map: &ColorMap) -> Result<()> {
        self.set_custom(&custom::encode_color_map(map))
    }

    /// Reports required to apply a custom color buffer.
    pub fn custom_transmission(&self, buffer: &CustomBuffer) -> Result<Transmission> {
        let chunks = transport::chunks(buffer.bytes(), self.chunk_size)?;

        // Announce the upload, the speed field carries the chunk count.
        let header = FeatureReport {
            kind: Kind::CustomConfig,
            mode: Mode::Static,
            speed: chunks.len() as u8,
            brightness: 0,
            color: Color::Black,
            commit: false,
        };

        // Switch to the uploaded colors.
        let commit = FeatureReport {
            kind: Kind::Preset,
            mode: Mode::Custom,
            speed: 5,
            brightness: 50,
            color: Color::Green,
            commit: true,
        };

        let mut reports = Vec::with_capacity(chunks.len() + 2);
        reports.push(Report::Feature(header.to_bytes()));
        reports.extend(chunks.into_iter().map(Report::Output));
        reports.push(Report::Feature(commit.to_bytes()));

        Ok(Transmission::new(reports))
    }

    /// Release the underlying channel.
    pub fn into_inner(self) -> C {
        self.channel
    }
}
