//! Named presentation themes.

use std::fmt;
use std::str::FromStr;

/// Cosmetic theme applied to the container before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageTheme {
    #[default]
    Default,
    Professional,
    Minimal,
}

/// Presentation rules selected by a [`PageTheme`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRules {
    /// CSS `font-family` for body text.
    pub font_family: &'static str,
    /// CSS color for headings.
    pub heading_color: &'static str,
}

impl PageTheme {
    /// Every theme, in display order.
    pub const ALL: [Self; 3] = [Self::Default, Self::Professional, Self::Minimal];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Professional => "professional",
            Self::Minimal => "minimal",
        }
    }

    /// Short description for listings.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Default => "System sans-serif, dark grey headings",
            Self::Professional => "Serif body, navy headings",
            Self::Minimal => "Helvetica, neutral grey headings",
        }
    }

    #[must_use]
    pub fn rules(self) -> ThemeRules {
        match self {
            Self::Default => ThemeRules {
                font_family: "-apple-system, 'Segoe UI', Roboto, sans-serif",
                heading_color: "#24292e",
            },
            Self::Professional => ThemeRules {
                font_family: "Georgia, 'Times New Roman', serif",
                heading_color: "#1a365d",
            },
            Self::Minimal => ThemeRules {
                font_family: "'Helvetica Neue', Arial, sans-serif",
                heading_color: "#333333",
            },
        }
    }
}

impl fmt::Display for PageTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| {
                format!("unknown theme '{s}' (expected default, professional or minimal)")
            })
    }
}
