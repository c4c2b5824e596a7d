/// Vertical scroll geometry in abstract units (rows for lists).
///
/// This is a snapshot consumed by [`crate::render::render_scrollbar`] and status lines; list
/// widgets own their scroll offsets and build one of these per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportState {
    pub y: u32,
    pub viewport_h: u16,
    pub content_h: u32,
}

impl ViewportState {
    pub fn new(y: usize, viewport_h: usize, content_h: usize) -> Self {
        Self {
            y: clamp_u32(y),
            viewport_h: viewport_h.min(u16::MAX as usize) as u16,
            content_h: clamp_u32(content_h),
        }
    }

    /// Percentage of content above the bottom edge of the viewport, or `None` when everything
    /// fits.
    pub fn percent_y(&self) -> Option<u8> {
        if self.content_h == 0 || self.viewport_h == 0 || self.content_h <= self.viewport_h as u32 {
            return None;
        }
        let visible_bottom = self.y.saturating_add(self.viewport_h as u32) as f64;
        let pct = (visible_bottom / self.content_h as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }
}

fn clamp_u32(v: usize) -> u32 {
    v.min(u32::MAX as usize) as u32
}
