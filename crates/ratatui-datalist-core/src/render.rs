//! Low-level drawing helpers shared by the list widgets.
//!
//! All writes go through [`Buffer`]; nothing here owns terminal state.
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::viewport::ViewportState;

const TAB_WIDTH: usize = 4;

/// Draws a one-column vertical scrollbar whose thumb tracks `state.y` over `state.content_h`.
pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    fill(area, buf, " ", style);
    let content_h = state.content_h;
    let viewport_h = state.viewport_h as u32;
    if content_h == 0 || content_h <= viewport_h {
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((viewport_h as f64 / content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h);
    let max_y = content_h.saturating_sub(viewport_h).max(1) as f64;
    let free = (track_h - thumb_h).max(0.0);
    let thumb_top = ((state.y as f64 / max_y) * free).round().clamp(0.0, free) as u16;
    let thumb_h = thumb_h as u16;

    for dy in thumb_top..thumb_top.saturating_add(thumb_h).min(area.height) {
        if let Some(cell) = buf.cell_mut((area.x, area.y + dy)) {
            cell.set_symbol("█");
            cell.set_style(style);
        }
    }
}

/// Fills every cell of `area` (clipped to the buffer) with `symbol` in `style`.
pub fn fill(area: Rect, buf: &mut Buffer, symbol: &str, style: Style) {
    let area = area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        }
    }
}

/// Writes `input` starting at `(x, y)`, skipping the first `start_col` display columns and
/// writing at most `max_cols` columns. Returns the number of columns written.
///
/// Wide glyphs are never split: a glyph straddling either edge is dropped.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) -> u16 {
    let mut pen = ClipPen::new(x, y, start_col, max_cols);
    pen.write(buf, input, style);
    pen.written()
}

/// Like [`render_str_clipped`] for a run of spans. Spans with a default style use
/// `fallback_style`.
pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'_>],
    fallback_style: Style,
) -> u16 {
    let mut pen = ClipPen::new(x, y, start_col, max_cols);
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        if !pen.write(buf, &span.content, style) {
            break;
        }
    }
    pen.written()
}

struct ClipPen {
    x: u16,
    y: u16,
    skip: usize,
    max: usize,
    col: usize,
    out: usize,
}

impl ClipPen {
    fn new(x: u16, y: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            x,
            y,
            skip: start_col as usize,
            max: max_cols as usize,
            col: 0,
            out: 0,
        }
    }

    fn written(&self) -> u16 {
        self.out.min(u16::MAX as usize) as u16
    }

    /// Returns `false` once the pen has run out of columns.
    fn write(&mut self, buf: &mut Buffer, input: &str, style: Style) -> bool {
        let mut tmp = [0u8; 4];
        for ch in input.chars() {
            if ch == '\t' {
                for _ in 0..TAB_WIDTH {
                    if !self.put(buf, " ", 1, style) {
                        return false;
                    }
                }
                continue;
            }
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if !self.put(buf, ch.encode_utf8(&mut tmp), w, style) {
                return false;
            }
        }
        true
    }

    fn put(&mut self, buf: &mut Buffer, symbol: &str, w: usize, style: Style) -> bool {
        let start = self.col;
        self.col += w;
        if start < self.skip {
            return true;
        }
        if self.out + w > self.max {
            return false;
        }
        let cx = self.x.saturating_add(self.out as u16);
        if let Some(cell) = buf.cell_mut((cx, self.y)) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
        // Trailing half of a wide glyph.
        for dx in 1..w {
            if let Some(cell) = buf.cell_mut((cx.saturating_add(dx as u16), self.y)) {
                cell.set_symbol("");
                cell.set_style(style);
            }
        }
        self.out += w;
        true
    }
}
