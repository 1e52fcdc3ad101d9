//! `mdpress themes` command implementation.

use mdpress_core::PageTheme;
use mdpress_renderer::SyntectHighlighter;

use crate::output::Output;

/// List the page themes for PDF output and the code highlighting themes.
pub(crate) fn list_themes(output: &Output) {
    output.info("Page themes (PDF output):");
    for theme in PageTheme::ALL {
        output.entry(theme.as_str(), theme.description());
    }

    output.info("");
    output.info("Highlight themes ([highlight] theme):");
    for name in SyntectHighlighter::theme_names() {
        output.entry(&name, "");
    }
}
