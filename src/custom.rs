//! Per-key color map encoding.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::layout::{self, KeyName, BUFFER_SIZE};

/// RGB color.
#[derive(Default, PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parse `#RRGGBB`, `0xRRGGBB` or `RRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid_parameter("color", s);

        let hex = s.strip_prefix('#').or_else(|| s.strip_prefix("0x")).unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let color = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        let [_, r, g, b] = color.to_be_bytes();
        Ok(Rgb { r, g, b })
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color assignment for individual keys.
///
/// Keys which are not part of the map are turned off.
pub type ColorMap = BTreeMap<KeyName, Rgb>;

/// Complete per-key color buffer as expected by the controller.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct CustomBuffer(Bytes);

impl CustomBuffer {
    /// Wrap a pre-built buffer, checking its size.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() != BUFFER_SIZE {
            return Err(Error::InvalidLength { expected: BUFFER_SIZE, actual: bytes.len() });
        }
        Ok(Self(bytes))
    }

    /// Raw buffer bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    /// Color of every key in the layout.
    pub fn color_map(&self) -> ColorMap {
        KeyName::ALL
            .iter()
            .map(|&key| {
                let offset = layout::offset_of(key);
                let rgb = &self.0[offset..offset + 3];
                (key, Rgb::new(rgb[0], rgb[1], rgb[2]))
            })
            .collect()
    }
}

impl AsRef<[u8]> for CustomBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&ColorMap> for CustomBuffer {
    fn from(map: &ColorMap) -> Self {
        encode_color_map(map)
    }
}

/// Convert a key color map to the controller's buffer format.
pub fn encode_color_map(map: &ColorMap) -> CustomBuffer {
    encode(map.iter().map(|(key, color)| (*key, *color)))
}

/// Convert colors addressed by key name to the controller's buffer format.
///
/// Fails without producing a buffer if any name is not part of the layout.
/// Later assignments to the same key replace earlier ones.
pub fn encode_named<'a, I>(colors: I) -> Result<CustomBuffer>
where
    I: IntoIterator<Item = (&'a str, Rgb)>,
{
    let colors = colors
        .into_iter()
        .map(|(name, color)| Ok((name.parse::<KeyName>()?, color)))
        .collect::<Result<Vec<_>>>()?;

    Ok(encode(colors))
}

/// Read back the color of every key from a controller buffer.
pub fn decode_color_map(buffer: &[u8]) -> Result<ColorMap> {
    Ok(CustomBuffer::from_bytes(Bytes::copy_from_slice(buffer))?.color_map())
}

fn encode(colors: impl IntoIterator<Item = (KeyName, Rgb)>) -> CustomBuffer {
    let mut buf = BytesMut::zeroed(BUFFER_SIZE);

    for (key, color) in colors {
        let offset = layout::offset_of(key);
        buf[offset..offset + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    CustomBuffer(buf.freeze())
}
