//! Syntax highlighting for fenced code blocks.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Error from a [`CodeHighlighter`].
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// The configured theme does not exist.
    #[error("unknown highlight theme '{0}'")]
    UnknownTheme(String),
    /// The highlighting engine failed on the given input.
    #[error("failed to highlight {language} code: {source}")]
    Engine {
        language: String,
        #[source]
        source: syntect::Error,
    },
}

/// Highlight callback invoked for every fenced code block with a language.
///
/// Implementations return `Ok(None)` for languages they do not know. Errors are
/// logged by the renderer and never abort rendering.
pub trait CodeHighlighter: Send + Sync {
    /// Return highlighted inner HTML for `code`, or `None` if unsupported.
    ///
    /// # Errors
    ///
    /// Returns an error if highlighting failed part way.
    fn highlight(&self, code: &str, language: &str) -> Result<Option<String>, HighlightError>;
}

/// [`CodeHighlighter`] backed by syntect's bundled grammars and themes.
///
/// Output is inline-styled `<span>` elements, so the HTML needs no stylesheet.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Load the bundled grammars and the named theme.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError::UnknownTheme`] if `theme` is not bundled.
    pub fn new(theme: &str) -> Result<Self, HighlightError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme)
            .ok_or_else(|| HighlightError::UnknownTheme(theme.to_owned()))?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Names of the bundled themes.
    #[must_use]
    pub fn theme_names() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Option<String>, HighlightError> {
        let Some(syntax) = self.syntaxes.find_syntax_by_token(language) else {
            return Ok(None);
        };

        let engine_error = |source: syntect::Error| HighlightError::Engine {
            language: language.to_owned(),
            source,
        };

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut html = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let regions = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(engine_error)?;
            let line_html = styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)
                .map_err(engine_error)?;
            html.push_str(&line_html);
        }
        Ok(Some(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme() {
        let err = SyntectHighlighter::new("No Such Theme").err().unwrap();
        assert_eq!(err.to_string(), "unknown highlight theme 'No Such Theme'");
    }

    #[test]
    fn test_highlights_known_language() {
        let highlighter = SyntectHighlighter::new("InspiredGitHub").unwrap();
        let html = highlighter
            .highlight("fn main() {}\n", "rust")
            .unwrap()
            .unwrap();
        assert!(html.contains("<span style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_escapes_code() {
        let highlighter = SyntectHighlighter::new("InspiredGitHub").unwrap();
        let html = highlighter
            .highlight("if a < b { }\n", "rust")
            .unwrap()
            .unwrap();
        assert!(html.contains("&lt;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn test_unknown_language_is_none() {
        let highlighter = SyntectHighlighter::new("InspiredGitHub").unwrap();
        assert!(highlighter.highlight("x", "no-such-lang").unwrap().is_none());
    }

    #[test]
    fn test_theme_names_include_default() {
        assert!(SyntectHighlighter::theme_names().contains(&"InspiredGitHub".to_owned()));
    }
}
