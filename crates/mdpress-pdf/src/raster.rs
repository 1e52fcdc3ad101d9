//! Rasterization of the styled container.
//!
//! The default [`CommandRasterizer`] shells out to an HTML-to-image program
//! (`wkhtmltoimage` compatible). Input and output files live in a temporary
//! directory that is removed when the call returns, on success or failure.

use std::future::Future;
use std::io;
use std::path::Path;

use image::RgbImage;
use tokio::process::Command;

/// Default HTML-to-image program.
pub const DEFAULT_RASTERIZER: &str = "wkhtmltoimage";

const INPUT_FILE: &str = "container.html";
const OUTPUT_FILE: &str = "container.png";

/// Viewport and zoom used for one rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSpec {
    /// Logical viewport width in CSS pixels.
    pub width_px: u32,
    /// Oversampling factor.
    pub scale: f32,
}

impl RasterSpec {
    /// Width of the produced raster in device pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn device_width_px(&self) -> u32 {
        (f64::from(self.width_px) * f64::from(self.scale)).round() as u32
    }
}

/// Rasterization error.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to start rasterizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("rasterizer '{program}' exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("invalid raster image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("rasterizer produced an empty image")]
    Empty,
}

/// Turns a complete HTML document into a single RGB raster.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        html: &str,
        spec: RasterSpec,
    ) -> impl Future<Output = Result<RgbImage, RasterError>> + Send;
}

/// [`Rasterizer`] running an external HTML-to-image program.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_RASTERIZER)
    }
}

impl CommandRasterizer {
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the input and output paths.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_args(&self, spec: RasterSpec, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_owned(),
            "--format".to_owned(),
            "png".to_owned(),
            "--width".to_owned(),
            spec.device_width_px().to_string(),
            "--zoom".to_owned(),
            spec.scale.to_string(),
        ];
        args.extend(self.args.iter().cloned());
        args.push(input.display().to_string());
        args.push(output.display().to_string());
        args
    }
}

impl Rasterizer for CommandRasterizer {
    async fn rasterize(&self, html: &str, spec: RasterSpec) -> Result<RgbImage, RasterError> {
        let dir = tempfile::Builder::new().prefix("mdpress-").tempdir()?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(OUTPUT_FILE);
        tokio::fs::write(&input, html).await?;

        let result = Command::new(&self.program)
            .args(self.command_args(spec, &input, &output))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RasterError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RasterError::Command {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }

        let png = tokio::fs::read(&output).await?;
        tracing::debug!(bytes = png.len(), program = %self.program, "Rasterized container");
        decode_raster(&png)
    }
}

/// Decode raster bytes into RGB, rejecting empty images.
pub fn decode_raster(data: &[u8]) -> Result<RgbImage, RasterError> {
    let raster = image::load_from_memory(data)?.to_rgb8();
    if raster.width() == 0 || raster.height() == 0 {
        return Err(RasterError::Empty);
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn test_device_width() {
        let spec = RasterSpec {
            width_px: 794,
            scale: 2.0,
        };
        assert_eq!(spec.device_width_px(), 1588);
    }

    #[test]
    fn test_command_args() {
        let rasterizer =
            CommandRasterizer::default().with_args(vec!["--enable-local-file-access".to_owned()]);
        let spec = RasterSpec {
            width_px: 794,
            scale: 2.0,
        };
        let args = rasterizer.command_args(spec, Path::new("in.html"), Path::new("out.png"));
        assert_eq!(
            args,
            vec![
                "--quiet",
                "--format",
                "png",
                "--width",
                "1588",
                "--zoom",
                "2",
                "--enable-local-file-access",
                "in.html",
                "out.png",
            ]
        );
    }

    #[test]
    fn test_decode_raster() {
        let raster = decode_raster(&png_bytes(4, 3)).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
    }

    #[test]
    fn test_decode_invalid() {
        assert!(matches!(
            decode_raster(b"not an image"),
            Err(RasterError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let rasterizer = CommandRasterizer::new("mdpress-no-such-rasterizer");
        let spec = RasterSpec {
            width_px: 10,
            scale: 1.0,
        };
        let err = rasterizer.rasterize("<p>x</p>", spec).await.unwrap_err();
        assert!(matches!(err, RasterError::Spawn { .. }));
        assert!(err.to_string().contains("mdpress-no-such-rasterizer"));
    }
}
