use crate::keymap::Binding;
use crate::render;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Clone, Debug)]
pub struct HelpBarOptions {
    /// Description style. Falls back to `theme.text_muted` when left at the default.
    pub style: Style,
    /// Key label style. Falls back to `theme.accent` when left at the default.
    pub key_style: Style,
    pub separator: String,
}

impl Default for HelpBarOptions {
    fn default() -> Self {
        Self {
            style: Style::default(),
            key_style: Style::default(),
            separator: " • ".to_string(),
        }
    }
}

/// One-line summary of key bindings: `key desc • key desc`.
#[derive(Clone, Debug, Default)]
pub struct HelpBar {
    bindings: Vec<Binding>,
    options: HelpBarOptions,
}

impl HelpBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            options: HelpBarOptions::default(),
        }
    }

    pub fn with_options(bindings: Vec<Binding>, options: HelpBarOptions) -> Self {
        Self { bindings, options }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: Vec<Binding>) {
        self.bindings = bindings;
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = or_default(self.options.style, theme.text_muted);
        let key_style = or_default(self.options.key_style, theme.accent);
        buf.set_style(area, style);
        let spans = self.spans(style, key_style);
        render::render_spans_clipped(area.x, area.y, 0, area.width, buf, &spans, style);
    }

    fn spans(&self, style: Style, key_style: Style) -> Vec<Span<'_>> {
        let mut spans = Vec::with_capacity(self.bindings.len() * 4);
        for (i, b) in self.bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.options.separator.as_str(), style));
            }
            spans.push(Span::styled(b.help_key.as_str(), key_style));
            spans.push(Span::styled(" ", style));
            spans.push(Span::styled(b.help_desc.as_str(), style));
        }
        spans
    }
}

fn or_default(style: Style, fallback: Style) -> Style {
    if style == Style::default() {
        fallback
    } else {
        style
    }
}
