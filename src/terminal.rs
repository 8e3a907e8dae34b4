//! Character-art preview of a rendered frame

use crossterm::terminal;
use std::io::{self, stdout, BufWriter, Stdout, Write};

use crate::config::PreviewSettings;
use crate::renderer::Framebuffer;

/// Columns used when the terminal size cannot be queried
const FALLBACK_WIDTH: usize = 80;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 0.5;

/// Writes a downsampled character image of a framebuffer
pub struct TerminalPreview<W: Write = BufWriter<Stdout>> {
    width: usize,
    colored: bool,
    buffer: W,
}

impl TerminalPreview {
    /// Preview on stdout, sized to the current terminal
    pub fn new(settings: &PreviewSettings) -> Self {
        let width = match terminal::size() {
            Ok((w, _)) => w as usize,
            Err(e) => {
                tracing::debug!(error = %e, "Could not query terminal size, using {} columns", FALLBACK_WIDTH);
                FALLBACK_WIDTH
            }
        };
        let width = settings.max_width.map_or(width, |max| width.min(max));

        let preview = Self::with_writer(BufWriter::new(stdout()), width, settings.colored);
        tracing::debug!(columns = preview.width(), "Preview sized");
        preview
    }
}

impl<W: Write> TerminalPreview<W> {
    pub fn with_writer(buffer: W, width: usize, colored: bool) -> Self {
        Self {
            width: width.max(1),
            colored,
            buffer,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Nearest-neighbor downsample to the preview width, squashing rows to
    /// account for the cell aspect. Never upsamples.
    pub fn fit(&self, framebuffer: &Framebuffer) -> Framebuffer {
        let (src_w, src_h) = (framebuffer.width(), framebuffer.height());
        if src_w == 0 || src_h == 0 {
            return Framebuffer::new(0, 0);
        }

        let width = src_w.min(self.width);
        let scale = src_w as f64 / width as f64;
        let height = ((src_h as f64 / scale * CELL_ASPECT).round() as usize).max(1);

        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let src_y = ((y as f64 + 0.5) * src_h as f64 / height as f64) as usize;
            for x in 0..width {
                let src_x = ((x as f64 + 0.5) * scale) as usize;
                pixels.push(framebuffer.get(src_x.min(src_w - 1), src_y.min(src_h - 1)));
            }
        }

        Framebuffer::from_pixels(width, height, pixels)
    }

    /// Write the preview and flush
    pub fn render(&mut self, framebuffer: &Framebuffer) -> io::Result<()> {
        let fitted = self.fit(framebuffer);
        let content = if self.colored {
            fitted.to_ascii_colored()
        } else {
            fitted.to_ascii()
        };

        self.buffer.write_all(content.as_bytes())?;
        self.buffer.flush()
    }

    pub fn into_inner(self) -> W {
        self.buffer
    }
}
