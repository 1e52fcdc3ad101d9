//! Embedding rendered diagrams into HTML.

use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;

use crate::consts::STANDARD_DPI;

static GOOGLE_FONTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@import\s+url\([^)]*fonts\.googleapis\.com[^)]*\)\s*;?").unwrap()
});

/// SVG root `width` attribute with a pixel value.
static SVG_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*\s)width="(\d+)(?:px)?""#).unwrap());

/// SVG root `height` attribute with a pixel value.
static SVG_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*\s)height="(\d+)(?:px)?""#).unwrap());

static STYLE_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(width:\s*)(\d+)(px)").unwrap());

static STYLE_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(height:\s*)(\d+)(px)").unwrap());

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Scale SVG dimensions rendered at `dpi` down to the 96 DPI reference.
///
/// Both XML attributes (`width="136"`) and inline styles (`width:136px`) are
/// scaled by `96 / dpi`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn scale_svg_dimensions(svg: &str, dpi: u32) -> String {
    if dpi == STANDARD_DPI || dpi == 0 {
        return svg.to_owned();
    }

    let scale = f64::from(STANDARD_DPI) / f64::from(dpi);
    let scale_dim = |caps: &regex::Captures| {
        let value: f64 = caps[2].parse().unwrap_or(0.0);
        (value * scale).round() as u32
    };

    let result = SVG_WIDTH_RE.replace(svg, |caps: &regex::Captures| {
        format!(r#"{}width="{}""#, &caps[1], scale_dim(caps))
    });
    let result = SVG_HEIGHT_RE.replace(&result, |caps: &regex::Captures| {
        format!(r#"{}height="{}""#, &caps[1], scale_dim(caps))
    });
    let result = STYLE_WIDTH_RE.replace_all(&result, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], scale_dim(caps), &caps[3])
    });
    let result = STYLE_HEIGHT_RE.replace_all(&result, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], scale_dim(caps), &caps[3])
    });

    result.into_owned()
}

/// Remove Google Fonts `@import` rules so rasterization needs no network.
#[must_use]
pub fn strip_google_fonts_import(svg: &str) -> String {
    GOOGLE_FONTS_RE.replace_all(svg, "").into_owned()
}

/// Width and height from a PNG IHDR chunk.
pub(crate) fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[..8] != PNG_SIGNATURE {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// `<img>` tag embedding PNG bytes rendered at `dpi`, or `None` if not a PNG.
pub(crate) fn png_image_tag(data: &[u8], dpi: u32, alt: &str) -> Option<String> {
    let (width, _) = png_dimensions(data)?;
    let display_width = u64::from(width) * u64::from(STANDARD_DPI) / u64::from(dpi.max(1));
    Some(format!(
        r#"<img src="data:image/png;base64,{}" width="{display_width}" alt="{alt}">"#,
        BASE64_STANDARD.encode(data)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0, 0, 0, 13]);
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data
    }

    #[test]
    fn test_scale_svg_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100px">"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">"#
        );
    }

    #[test]
    fn test_scale_svg_style() {
        let svg = r#"<svg style="width:136px;height:210px;">"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg style="width:68px;height:105px;">"#
        );
    }

    #[test]
    fn test_scale_svg_standard_dpi_unchanged() {
        let svg = r#"<svg width="200" height="100">"#;
        assert_eq!(scale_svg_dimensions(svg, 96), svg);
    }

    #[test]
    fn test_strip_google_fonts() {
        let svg = "<style>@import url('https://fonts.googleapis.com/css?family=Roboto');\ntext{}</style>";
        assert_eq!(strip_google_fonts_import(svg), "<style>\ntext{}</style>");
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&png_header(640, 480)), Some((640, 480)));
        assert_eq!(png_dimensions(b"not a png at all, definitely"), None);
        assert_eq!(png_dimensions(PNG_SIGNATURE), None);
    }

    #[test]
    fn test_png_image_tag() {
        let tag = png_image_tag(&png_header(400, 300), 192, "diagram-0").unwrap();
        assert!(tag.starts_with(r#"<img src="data:image/png;base64,iVBORw0KGgo"#));
        assert!(tag.ends_with(r#" width="200" alt="diagram-0">"#));
    }
}
