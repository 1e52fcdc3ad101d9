//! `mdpress convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdpress_config::{CliSettings, Config};
use mdpress_core::{ConversionPipeline, Converter, OutputFormat, PageTheme, SourceDocument};
use mdpress_diagrams::{DiagramFormat, KrokiRenderer};
use mdpress_pdf::{CommandRasterizer, PageLayout};
use mdpress_renderer::SyntectHighlighter;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert.
    input: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "pdf")]
    format: OutputFormat,

    /// Page theme for PDF output (overrides config).
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory the document is written to (default: current directory).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdpress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "MDPRESS_KROKI_URL")]
    kroki_url: Option<String>,

    /// Disable syntax highlighting of code blocks.
    #[arg(long)]
    no_highlight: bool,

    /// Enable verbose output (show diagram warnings and page counts).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Page themes only apply to PDF output, so `--theme` is dropped for DOCX.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            kroki_url: self.kroki_url.clone(),
            theme: self.theme.clone().filter(|_| self.format == OutputFormat::Pdf),
            rasterizer: None,
            highlight_enabled: self.no_highlight.then_some(false),
        }
    }

    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the conversion fails or
    /// the document cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let theme: PageTheme = match self.format {
            OutputFormat::Pdf => config.pdf.theme.parse().map_err(CliError::Validation)?,
            OutputFormat::Docx => {
                if self.theme.is_some() {
                    output.warning("Page themes apply to PDF output only; --theme is ignored");
                }
                PageTheme::default()
            }
        };

        let source = SourceDocument::load(&self.input).await?;
        let converter = build_converter(&config, &output)?;
        let artifact = converter.convert(&source, self.format, theme).await?;

        let output_dir = self.output_dir.unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&output_dir).await?;
        let path = output_dir.join(&artifact.filename);
        tokio::fs::write(&path, &artifact.bytes).await?;

        output.success(&format!(
            "Wrote {} ({} bytes)",
            path.display(),
            artifact.bytes.len()
        ));
        Ok(())
    }
}

fn build_converter(
    config: &Config,
    output: &Output,
) -> Result<Converter<KrokiRenderer, CommandRasterizer>, CliError> {
    let mut pipeline = ConversionPipeline::<KrokiRenderer>::new();

    if config.highlight.enabled {
        let highlighter = SyntectHighlighter::new(&config.highlight.theme)
            .map_err(|e| CliError::Validation(e.to_string()))?;
        pipeline = pipeline.with_highlighter(highlighter);
    }

    let diagrams = &config.diagrams_resolved;
    if let Some(kroki_url) = &diagrams.kroki_url {
        let format: DiagramFormat = diagrams.format.parse().map_err(CliError::Validation)?;
        output.info(&format!("Kroki URL: {kroki_url}"));
        pipeline = pipeline.with_diagrams(
            KrokiRenderer::new(kroki_url)
                .with_timeout(diagrams.timeout)
                .with_format(format)
                .with_dpi(diagrams.dpi),
        );
    } else {
        output.info("Diagram rendering: disabled (no kroki_url in config)");
    }

    let rasterizer =
        CommandRasterizer::new(&config.pdf.rasterizer).with_args(config.pdf.rasterizer_args.clone());
    Ok(Converter::new(pipeline, rasterizer).with_layout(PageLayout::with_margin(config.pdf.margin_mm)))
}
