//! PPM image output
//!
//! Header is three lines: magic, `<width> <height>`, and the max value 255.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::math::Color;
use crate::renderer::Framebuffer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PpmFormat {
    /// ASCII samples, one per line
    P3,
    /// Raw bytes
    #[default]
    P6,
}

impl PpmFormat {
    pub fn magic(&self) -> &'static str {
        match self {
            PpmFormat::P3 => "P3",
            PpmFormat::P6 => "P6",
        }
    }
}

/// Scale a channel to 0..=255, truncating toward zero. NaN becomes 0.
pub fn to_channel(value: f64) -> u8 {
    // `as` saturates and maps NaN to 0
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

pub fn to_rgb8(color: &Color) -> [u8; 3] {
    [to_channel(color.x), to_channel(color.y), to_channel(color.z)]
}

/// Write `framebuffer` as a PPM stream
pub fn encode_ppm<W: Write>(writer: &mut W, framebuffer: &Framebuffer, format: PpmFormat) -> io::Result<()> {
    write!(
        writer,
        "{}\n{} {}\n255\n",
        format.magic(),
        framebuffer.width(),
        framebuffer.height()
    )?;

    match format {
        PpmFormat::P6 => {
            for color in framebuffer.pixels() {
                writer.write_all(&to_rgb8(color))?;
            }
        }
        PpmFormat::P3 => {
            for color in framebuffer.pixels() {
                for sample in to_rgb8(color) {
                    writeln!(writer, "{}", sample)?;
                }
            }
        }
    }

    writer.flush()
}

/// Write `framebuffer` to a PPM file, replacing any existing file
pub fn write_ppm<P: AsRef<Path>>(path: P, framebuffer: &Framebuffer, format: PpmFormat) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    encode_ppm(&mut writer, framebuffer, format)?;
    tracing::info!(
        path = %path.as_ref().display(),
        format = format.magic(),
        width = framebuffer.width(),
        height = framebuffer.height(),
        "Image written"
    );
    Ok(())
}
