//! Kroki diagram rendering over HTTP.
//!
//! Each diagram is POSTed as plain text to `{server}/{endpoint}/{format}`.
//! `ureq` is blocking, so requests run on tokio's blocking pool and the
//! materializer awaits them one at a time.

use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_DPI, DEFAULT_TIMEOUT};
use crate::embed::{png_image_tag, scale_svg_dimensions, strip_google_fonts_import};
use crate::language::DiagramFormat;
use crate::materializer::{
    DiagramBlock, DiagramError, DiagramErrorKind, DiagramRenderer, RenderedDiagram,
};

/// [`DiagramRenderer`] backed by a Kroki server.
#[derive(Clone)]
pub struct KrokiRenderer {
    agent: Agent,
    server_url: String,
    format: DiagramFormat,
    dpi: u32,
}

impl KrokiRenderer {
    /// Create a renderer for the Kroki server at `server_url`.
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
            server_url: server_url.trim_end_matches('/').to_owned(),
            format: DiagramFormat::default(),
            dpi: DEFAULT_DPI,
        }
    }

    /// Set the HTTP timeout for each request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Set the output format requested from Kroki.
    #[must_use]
    pub fn with_format(mut self, format: DiagramFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the DPI diagrams are rendered at.
    #[must_use]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    fn request_url(&self, block: &DiagramBlock) -> String {
        format!(
            "{}/{}/{}",
            self.server_url,
            block.language.kroki_endpoint(),
            self.format.as_str()
        )
    }

    /// Turn a response body into embeddable markup.
    fn to_markup(&self, id: &str, index: usize, body: Vec<u8>) -> Result<String, DiagramError> {
        let invalid = |message: String| DiagramError {
            index,
            kind: DiagramErrorKind::InvalidResponse(message),
        };

        match self.format {
            DiagramFormat::Svg => {
                let svg = String::from_utf8(body)
                    .map_err(|e| invalid(format!("invalid UTF-8 in SVG: {e}")))?;
                let svg = strip_google_fonts_import(svg.trim());
                Ok(scale_svg_dimensions(&svg, self.dpi))
            }
            DiagramFormat::Png => png_image_tag(&body, self.dpi, id)
                .ok_or_else(|| invalid("invalid PNG data".to_owned())),
        }
    }
}

impl DiagramRenderer for KrokiRenderer {
    async fn render(&self, id: &str, block: &DiagramBlock) -> Result<RenderedDiagram, DiagramError> {
        let index = block.index;
        let agent = self.agent.clone();
        let url = self.request_url(block);
        let source = block.source.clone();

        let body = tokio::task::spawn_blocking(move || send_diagram_request(&agent, &url, &source, index))
            .await
            .map_err(|e| DiagramError {
                index,
                kind: DiagramErrorKind::Task(e.to_string()),
            })??;

        let markup = self.to_markup(id, index, body)?;
        Ok(RenderedDiagram { markup })
    }
}

/// HTTP agent with the given global timeout.
///
/// HTTP status codes are not turned into errors so that the Kroki error
/// body can be reported.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// POST diagram source and return the response body.
fn send_diagram_request(
    agent: &Agent,
    url: &str,
    source: &str,
    index: usize,
) -> Result<Vec<u8>, DiagramError> {
    let response = agent
        .post(url)
        .header("Content-Type", "text/plain")
        .send(source.as_bytes())
        .map_err(|e| DiagramError {
            index,
            kind: DiagramErrorKind::Http(e.to_string()),
        })?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError {
            index,
            kind: DiagramErrorKind::Http(format!("HTTP {status}: {}", error_body.trim())),
        });
    }

    body.read_to_vec().map_err(|e| DiagramError {
        index,
        kind: DiagramErrorKind::Io(e.to_string()),
    })
}
