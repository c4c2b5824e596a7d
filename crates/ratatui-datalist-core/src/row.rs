use ratatui::style::Style;

/// A materialized presentation unit.
///
/// Rows are owned by the list that displays them and never borrow from the data source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualRow {
    pub primary: String,
    pub secondary: Option<String>,
    /// Short glyph drawn before the primary text.
    pub icon: Option<String>,
    /// Caller-defined payload, e.g. a database key.
    pub tag: Option<u64>,
    /// Patched over the list's base style.
    pub style: Style,
}

impl VisualRow {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            ..Self::default()
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl From<&str> for VisualRow {
    fn from(primary: &str) -> Self {
        Self::new(primary)
    }
}

impl From<String> for VisualRow {
    fn from(primary: String) -> Self {
        Self::new(primary)
    }
}
