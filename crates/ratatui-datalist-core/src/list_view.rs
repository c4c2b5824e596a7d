//! A scrollable, selectable, filterable list of [`VisualRow`]s.
//!
//! [`ListView`] knows nothing about where rows come from. It keeps selection, hover and scroll
//! state over a *projection*: all rows, or only the rows matching the active filter. It draws
//! only the rows inside the viewport.
//!
//! For windowed lists (see [`crate::data_list`]) the view can be told the total item count with
//! [`ListView::set_total`]. In that mode projection indices are global source indices and rows
//! hold only the materialized window starting at [`ListView::window_start`].
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;

use crate::error::DataListError;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::keymap::Binding;
use crate::render;
use crate::row::VisualRow;
use crate::theme::Theme;
use crate::viewport::ViewportState;

const WHEEL_STEP: isize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListAction {
    None,
    Redraw,
    /// Enter was pressed on the row with this source index.
    Activated(usize),
    SelectionChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListCommand {
    Up,
    Down,
    First,
    Last,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Activate,
}

/// Key bindings for list navigation. Defaults are arrow keys plus Vim-style letters.
#[derive(Clone, Debug)]
pub struct ListBindings {
    pub up: Vec<KeyEvent>,
    pub down: Vec<KeyEvent>,
    pub first: Vec<KeyEvent>,
    pub last: Vec<KeyEvent>,
    pub page_up: Vec<KeyEvent>,
    pub page_down: Vec<KeyEvent>,
    pub half_page_up: Vec<KeyEvent>,
    pub half_page_down: Vec<KeyEvent>,
    pub activate: Vec<KeyEvent>,
}

impl Default for ListBindings {
    fn default() -> Self {
        Self {
            up: vec![keymap::key(KeyCode::Up), keymap::key_char('k')],
            down: vec![keymap::key(KeyCode::Down), keymap::key_char('j')],
            first: vec![keymap::key(KeyCode::Home), keymap::key_char('g')],
            last: vec![keymap::key(KeyCode::End), keymap::key_char('G')],
            page_up: vec![keymap::key(KeyCode::PageUp)],
            page_down: vec![keymap::key(KeyCode::PageDown)],
            half_page_up: vec![keymap::key_ctrl('u')],
            half_page_down: vec![keymap::key_ctrl('d')],
            activate: vec![keymap::key(KeyCode::Enter)],
        }
    }
}

impl ListBindings {
    pub(crate) fn command_for(&self, key: &KeyEvent) -> Option<ListCommand> {
        let table = [
            (&self.up, ListCommand::Up),
            (&self.down, ListCommand::Down),
            (&self.first, ListCommand::First),
            (&self.last, ListCommand::Last),
            (&self.page_up, ListCommand::PageUp),
            (&self.page_down, ListCommand::PageDown),
            (&self.half_page_up, ListCommand::HalfPageUp),
            (&self.half_page_down, ListCommand::HalfPageDown),
            (&self.activate, ListCommand::Activate),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keymap::matches_any(keys, key))
            .map(|(_, cmd)| cmd)
    }

    /// Bindings for a [`crate::help::HelpBar`].
    pub fn help(&self) -> Vec<Binding> {
        let mut nav = self.up.clone();
        nav.extend(self.down.iter().cloned());
        let mut ends = self.first.clone();
        ends.extend(self.last.iter().cloned());
        let mut pages = self.page_up.clone();
        pages.extend(self.page_down.iter().cloned());
        vec![
            Binding::new("↑/↓", "move", nav),
            Binding::new("g/G", "first/last", ends),
            Binding::new("PgUp/PgDn", "page", pages),
            Binding::new("enter", "open", self.activate.clone()),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct ListViewOptions {
    /// Terminal rows per item. Values below 1 are treated as 1.
    pub item_height: usize,
    pub show_scrollbar: bool,
    /// Draw secondary text after the primary text when `item_height == 1`. Taller items always
    /// put it on the second line.
    pub show_secondary: bool,
    pub style: Style,
    pub selected_style: Style,
    pub hovered_style: Style,
    pub secondary_style: Style,
    pub scrollbar_style: Style,
    pub empty_text: String,
    pub no_match_text: String,
    pub bindings: ListBindings,
}

impl Default for ListViewOptions {
    fn default() -> Self {
        Self {
            item_height: 1,
            show_scrollbar: true,
            show_secondary: true,
            style: Style::default(),
            selected_style: Style::default().add_modifier(Modifier::REVERSED),
            hovered_style: Style::default().add_modifier(Modifier::BOLD),
            secondary_style: Style::default(),
            scrollbar_style: Style::default(),
            empty_text: "No items".to_string(),
            no_match_text: "No matches".to_string(),
            bindings: ListBindings::default(),
        }
    }
}

#[derive(Clone, Debug)]
struct Filter {
    query: String,
    /// Row indices whose primary text contains `query`, ascending.
    matches: Vec<usize>,
}

impl Filter {
    fn accepts(&self, row: &VisualRow) -> bool {
        row.primary.contains(self.query.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct ListView {
    options: ListViewOptions,
    rows: Vec<VisualRow>,
    filter: Option<Filter>,
    selected: Option<usize>,
    hovered: Option<usize>,
    scroll_offset: usize,
    visible_count: usize,
    total: Option<usize>,
    window_start: usize,
    last_area: Option<Rect>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::with_options(ListViewOptions::default())
    }
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ListViewOptions) -> Self {
        Self {
            options,
            rows: Vec::new(),
            filter: None,
            selected: None,
            hovered: None,
            scroll_offset: 0,
            visible_count: 1,
            total: None,
            window_start: 0,
            last_area: None,
        }
    }

    pub fn options(&self) -> &ListViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ListViewOptions) {
        self.options = options;
    }

    pub fn item_height(&self) -> usize {
        self.options.item_height.max(1)
    }

    /// Number of materialized rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[VisualRow] {
        &self.rows
    }

    /// Length of the projection that selection and scrolling operate on.
    pub fn visible_len(&self) -> usize {
        match (&self.filter, self.total) {
            (Some(f), _) => f.matches.len(),
            (None, Some(total)) => total,
            (None, None) => self.rows.len(),
        }
    }

    /// The row at projection index `index`, if it is materialized.
    pub fn row(&self, index: usize) -> Option<&VisualRow> {
        self.local_index(index).and_then(|i| self.rows.get(i))
    }

    /// Maps a projection index back to the source index it came from.
    pub fn source_index(&self, index: usize) -> Option<usize> {
        if index >= self.visible_len() {
            return None;
        }
        match &self.filter {
            Some(f) => f.matches.get(index).map(|&i| i + self.window_offset()),
            None => Some(index),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&VisualRow> {
        self.selected.and_then(|i| self.row(i))
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Rows that fit in the viewport, as computed by the last render.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn set_visible_count(&mut self, count: usize) {
        self.visible_count = count.max(1);
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_ref().map(|f| f.query.as_str())
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Appends a row. Selects the first projection entry when nothing is selected yet.
    ///
    /// On allocation failure the row is dropped and the list is left as it was.
    pub fn add_item(&mut self, row: VisualRow) -> Result<(), DataListError> {
        let index = self.rows.len();
        self.rows
            .try_reserve(1)
            .map_err(|e| DataListError::allocation(index, e))?;
        if let Some(filter) = &mut self.filter
            && filter.accepts(&row)
        {
            filter
                .matches
                .try_reserve(1)
                .map_err(|e| DataListError::allocation(index, e))?;
            filter.matches.push(index);
        }
        self.rows.push(row);
        if self.selected.is_none() && self.visible_len() > 0 {
            self.selected = Some(0);
        }
        Ok(())
    }

    /// Replaces the row at raw row index `index`. Returns `false` when out of range.
    pub fn replace_item(&mut self, index: usize, row: VisualRow) -> bool {
        let Some(slot) = self.rows.get_mut(index) else {
            return false;
        };
        *slot = row;
        if let Some(filter) = &mut self.filter {
            let accepted = filter.accepts(&self.rows[index]);
            match (filter.matches.binary_search(&index), accepted) {
                (Ok(pos), false) => {
                    filter.matches.remove(pos);
                }
                (Err(pos), true) => filter.matches.insert(pos, index),
                _ => {}
            }
        }
        self.clamp_state();
        true
    }

    /// Swaps in a new set of materialized rows, keeping selection, hover, scroll and the filter
    /// query (clamped to the new projection). Selects the first entry when nothing is selected.
    pub fn replace_rows(&mut self, rows: Vec<VisualRow>) -> Result<(), DataListError> {
        if let Some(filter) = &mut self.filter {
            let mut matches = Vec::new();
            matches
                .try_reserve(rows.len())
                .map_err(|_| DataListError::FilterAllocation)?;
            matches.extend(
                rows.iter()
                    .enumerate()
                    .filter(|(_, r)| filter.accepts(r))
                    .map(|(i, _)| i),
            );
            filter.matches = matches;
        }
        self.rows = rows;
        self.clamp_state();
        if self.selected.is_none() && self.visible_len() > 0 {
            self.selected = Some(0);
        }
        Ok(())
    }

    /// Drops every materialized row but keeps selection, scroll, hover and the filter query.
    pub fn release_rows(&mut self) {
        self.rows = Vec::new();
        if let Some(filter) = &mut self.filter {
            filter.matches = Vec::new();
        }
        self.clamp_state();
    }

    /// Drops every row and the filter, and resets selection, hover and scroll.
    pub fn clear(&mut self) {
        self.rows = Vec::new();
        self.filter = None;
        self.selected = None;
        self.hovered = None;
        self.scroll_offset = 0;
    }

    /// Sets the total item count for windowed lists (`None` for a plain list).
    pub fn set_total(&mut self, total: Option<usize>) {
        self.total = total;
        self.clamp_state();
    }

    /// Source index of the first materialized row in windowed mode.
    pub fn set_window_start(&mut self, start: usize) {
        self.window_start = start;
    }

    /// Filters the projection to rows whose primary text contains `query` (case-sensitive).
    /// An empty query removes the filter. Selection moves to the first surviving row.
    pub fn set_filter(&mut self, query: &str) -> Result<(), DataListError> {
        if query.is_empty() {
            self.filter = None;
        } else {
            let mut matches = Vec::new();
            matches
                .try_reserve(self.rows.len())
                .map_err(|_| DataListError::FilterAllocation)?;
            matches.extend(
                self.rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.primary.contains(query))
                    .map(|(i, _)| i),
            );
            self.filter = Some(Filter {
                query: query.to_string(),
                matches,
            });
        }
        self.hovered = None;
        self.scroll_offset = 0;
        self.selected = (self.visible_len() > 0).then_some(0);
        Ok(())
    }

    pub fn select_next(&mut self) -> bool {
        self.select_by(1)
    }

    pub fn select_previous(&mut self) -> bool {
        self.select_by(-1)
    }

    pub fn select_first(&mut self) -> bool {
        let len = self.visible_len();
        if len == 0 {
            return false;
        }
        self.select_index(0)
    }

    pub fn select_last(&mut self) -> bool {
        let len = self.visible_len();
        if len == 0 {
            return false;
        }
        self.select_index(len - 1)
    }

    /// Selects `index` (clamped to the projection) and scrolls it into view.
    pub fn set_selected(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if self.visible_len() > 0 => self.select_index(i.min(self.visible_len() - 1)),
            _ => {
                let changed = self.selected.is_some();
                self.selected = None;
                changed
            }
        }
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|&i| i < self.visible_len());
    }

    /// Moves the selection by `delta` projection entries. A missing selection starts at 0.
    pub fn select_by(&mut self, delta: isize) -> bool {
        let len = self.visible_len();
        if len == 0 {
            return false;
        }
        let next = match self.selected {
            None => 0,
            Some(cur) => cur.saturating_add_signed(delta).min(len - 1),
        };
        self.select_index(next)
    }

    fn select_index(&mut self, index: usize) -> bool {
        let changed = self.selected != Some(index);
        self.selected = Some(index);
        self.ensure_selected_visible();
        changed
    }

    /// Scrolls the minimum amount needed to show the selected row.
    pub fn ensure_selected_visible(&mut self) {
        let Some(selected) = self.selected else {
            return;
        };
        let visible = self.visible_count.max(1);
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset.saturating_add(visible) {
            self.scroll_offset = selected + 1 - visible;
        }
        self.clamp_scroll();
    }

    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
        self.clamp_scroll();
    }

    /// Returns `true` if the offset changed.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let before = self.scroll_offset;
        self.scroll_offset = before.saturating_add_signed(delta);
        self.clamp_scroll();
        self.scroll_offset != before
    }

    /// Scroll geometry for scrollbars and status lines.
    pub fn viewport(&self) -> ViewportState {
        ViewportState::new(self.scroll_offset, self.visible_count, self.visible_len())
    }

    /// Handles an event using the area of the last render for mouse hit-testing.
    pub fn handle_event(&mut self, event: InputEvent) -> ListAction {
        match self.last_area {
            Some(area) => self.handle_event_in_area(area, event),
            None => match event {
                InputEvent::Key(key) => self.handle_key(&key),
                InputEvent::Paste(_) | InputEvent::Mouse(_) => ListAction::None,
            },
        }
    }

    pub fn handle_event_in_area(&mut self, area: Rect, event: InputEvent) -> ListAction {
        match event {
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Mouse(m) => self.handle_mouse(area, m),
            InputEvent::Paste(_) => ListAction::None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ListAction {
        let Some(cmd) = self.options.bindings.command_for(key) else {
            return ListAction::None;
        };
        let page = self.visible_count.max(1) as isize;
        let changed = match cmd {
            ListCommand::Up => self.select_by(-1),
            ListCommand::Down => self.select_by(1),
            ListCommand::First => self.select_first(),
            ListCommand::Last => self.select_last(),
            ListCommand::PageUp => self.select_by(-page),
            ListCommand::PageDown => self.select_by(page),
            ListCommand::HalfPageUp => self.select_by(-(page / 2).max(1)),
            ListCommand::HalfPageDown => self.select_by((page / 2).max(1)),
            ListCommand::Activate => {
                return self
                    .selected
                    .and_then(|i| self.source_index(i))
                    .map(ListAction::Activated)
                    .unwrap_or(ListAction::None);
            }
        };
        if changed {
            ListAction::SelectionChanged
        } else {
            ListAction::None
        }
    }

    fn handle_mouse(&mut self, area: Rect, event: MouseEvent) -> ListAction {
        let redraw_if = |moved: bool| {
            if moved {
                ListAction::Redraw
            } else {
                ListAction::None
            }
        };
        match event.kind {
            MouseEventKind::ScrollUp => return redraw_if(self.scroll_by(-WHEEL_STEP)),
            MouseEventKind::ScrollDown => return redraw_if(self.scroll_by(WHEEL_STEP)),
            _ => {}
        }

        let (content, _) = self.split_scrollbar(area);
        let hit = event
            .position_in(content)
            .map(|(_, rel_y)| self.scroll_offset + rel_y as usize / self.item_height())
            .filter(|&i| i < self.visible_len());

        match event.kind {
            MouseEventKind::Moved => {
                let before = self.hovered;
                self.hovered = hit;
                redraw_if(before != self.hovered)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let changed = hit.is_some_and(|i| self.select_index(i));
                if changed {
                    ListAction::SelectionChanged
                } else {
                    ListAction::None
                }
            }
            _ => ListAction::None,
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.last_area = Some(area);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let item_height = self.item_height();
        self.visible_count = (area.height as usize / item_height).max(1);
        self.clamp_scroll();

        let (content, scrollbar) = self.split_scrollbar(area);
        let base = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        let secondary = if self.options.secondary_style == Style::default() {
            theme.text_muted
        } else {
            self.options.secondary_style
        };
        let selected_style = base.patch(theme.accent).patch(self.options.selected_style);
        let hovered_style = base.patch(self.options.hovered_style);
        buf.set_style(content, base);

        let len = self.visible_len();
        if len == 0 {
            let message = if self.filter.is_some() {
                &self.options.no_match_text
            } else {
                &self.options.empty_text
            };
            render::render_str_clipped(
                content.x,
                content.y,
                0,
                content.width,
                buf,
                message,
                theme.text_muted,
            );
            return;
        }

        let end = self.scroll_offset.saturating_add(self.visible_count).min(len);
        for (slot, index) in (self.scroll_offset..end).enumerate() {
            let dy = slot * item_height;
            if dy >= content.height as usize {
                break;
            }
            let h = item_height.min(content.height as usize - dy) as u16;
            let row_area = Rect::new(content.x, content.y + dy as u16, content.width, h);
            let state_style = if self.selected == Some(index) {
                selected_style
            } else if self.hovered == Some(index) {
                hovered_style
            } else {
                base
            };
            buf.set_style(row_area, state_style);
            if let Some(row) = self.row(index) {
                draw_row(
                    row_area,
                    buf,
                    row,
                    state_style.patch(row.style),
                    state_style.patch(secondary),
                    self.options.show_secondary,
                );
            }
        }

        if let Some(sb) = scrollbar {
            render::render_scrollbar(sb, buf, &self.viewport(), self.options.scrollbar_style);
        }
    }

    fn split_scrollbar(&self, area: Rect) -> (Rect, Option<Rect>) {
        if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(Rect::new(area.x + area.width - 1, area.y, 1, area.height)),
            )
        } else {
            (area, None)
        }
    }

    fn window_offset(&self) -> usize {
        if self.total.is_some() {
            self.window_start
        } else {
            0
        }
    }

    fn local_index(&self, index: usize) -> Option<usize> {
        match &self.filter {
            Some(f) => f.matches.get(index).copied(),
            None if self.total.is_some() => index
                .checked_sub(self.window_start)
                .filter(|&i| i < self.rows.len()),
            None => (index < self.rows.len()).then_some(index),
        }
    }

    fn clamp_scroll(&mut self) {
        let max = self.visible_len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.min(max);
    }

    fn clamp_state(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = None;
            self.hovered = None;
            self.scroll_offset = 0;
            return;
        }
        self.selected = self.selected.map(|i| i.min(len - 1));
        self.hovered = self.hovered.filter(|&i| i < len);
        self.clamp_scroll();
    }
}

fn draw_row(
    area: Rect,
    buf: &mut Buffer,
    row: &VisualRow,
    style: Style,
    secondary_style: Style,
    inline_secondary: bool,
) {
    let mut x = area.x;
    let right = area.x.saturating_add(area.width);
    let mut put = |x: &mut u16, y: u16, text: &str, style: Style| {
        let room = right.saturating_sub(*x);
        *x += render::render_str_clipped(*x, y, 0, room, buf, text, style);
    };

    if let Some(icon) = &row.icon {
        put(&mut x, area.y, icon, style);
        put(&mut x, area.y, " ", style);
    }
    put(&mut x, area.y, &row.primary, style);

    let Some(secondary) = &row.secondary else {
        return;
    };
    if area.height >= 2 {
        let mut x2 = area.x;
        put(&mut x2, area.y + 1, secondary, secondary_style);
    } else if inline_secondary {
        put(&mut x, area.y, "  ", secondary_style);
        put(&mut x, area.y, secondary, secondary_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;

    fn list_of(names: &[&str]) -> ListView {
        let mut v = ListView::new();
        for n in names {
            v.add_item(VisualRow::new(*n)).unwrap();
        }
        v
    }

    fn numbered(n: usize) -> ListView {
        let mut v = ListView::new();
        for i in 0..n {
            v.add_item(VisualRow::new(format!("row {i}"))).unwrap();
        }
        v
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::key(code)
    }

    #[test]
    fn first_add_selects_index_zero() {
        let mut v = ListView::new();
        assert_eq!(v.selected(), None);
        v.add_item(VisualRow::new("a")).unwrap();
        assert_eq!(v.selected(), Some(0));
        v.select_next();
        v.add_item(VisualRow::new("b")).unwrap();
        assert_eq!(v.selected(), Some(0));
    }

    #[test]
    fn clear_resets_everything() {
        let mut v = numbered(10);
        v.set_visible_count(3);
        v.select_last();
        v.set_filter("row").unwrap();
        v.set_hovered(Some(2));
        v.clear();
        assert_eq!(v.len(), 0);
        assert_eq!(v.selected(), None);
        assert_eq!(v.hovered(), None);
        assert_eq!(v.scroll_offset(), 0);
        assert_eq!(v.filter(), None);
    }

    #[test]
    fn selection_moves_and_stays_visible() {
        let mut v = numbered(10);
        v.set_visible_count(3);
        for _ in 0..4 {
            v.select_next();
        }
        assert_eq!(v.selected(), Some(4));
        assert_eq!(v.scroll_offset(), 2);

        v.select_first();
        assert_eq!(v.scroll_offset(), 0);

        v.select_last();
        assert_eq!(v.selected(), Some(9));
        assert_eq!(v.scroll_offset(), 7);

        assert!(!v.select_next());
        assert_eq!(v.selected(), Some(9));
    }

    #[test]
    fn selection_ops_are_noops_on_empty_projection() {
        let mut v = ListView::new();
        assert!(!v.select_next());
        assert!(!v.select_previous());
        assert!(!v.select_first());
        assert!(!v.select_last());
        assert_eq!(v.selected(), None);
    }

    #[test]
    fn scroll_is_clamped_to_last_row() {
        let mut v = numbered(5);
        v.set_scroll_offset(100);
        assert_eq!(v.scroll_offset(), 4);
        assert!(v.scroll_by(-10));
        assert_eq!(v.scroll_offset(), 0);
    }

    #[test]
    fn filter_keeps_matching_rows_in_order() {
        let mut v = list_of(&["apple", "banana", "grape", "pineapple", "Apple"]);
        v.set_filter("apple").unwrap();
        assert_eq!(v.visible_len(), 2);
        assert_eq!(v.row(0).map(|r| r.primary.as_str()), Some("apple"));
        assert_eq!(v.row(1).map(|r| r.primary.as_str()), Some("pineapple"));
        assert_eq!(v.selected(), Some(0));
        assert_eq!(v.source_index(1), Some(3));

        v.set_filter("").unwrap();
        assert_eq!(v.visible_len(), 5);
    }

    #[test]
    fn filter_without_matches_clears_selection() {
        let mut v = list_of(&["alpha", "beta"]);
        v.set_filter("zzz").unwrap();
        assert_eq!(v.visible_len(), 0);
        assert_eq!(v.selected(), None);
    }

    #[test]
    fn added_rows_join_active_filter() {
        let mut v = list_of(&["alpha"]);
        v.set_filter("x").unwrap();
        assert_eq!(v.selected(), None);
        v.add_item(VisualRow::new("beta")).unwrap();
        assert_eq!(v.selected(), None);
        v.add_item(VisualRow::new("xray")).unwrap();
        assert_eq!(v.visible_len(), 1);
        assert_eq!(v.selected(), Some(0));
        assert_eq!(v.source_index(0), Some(2));
    }

    #[test]
    fn replace_item_updates_filter_membership() {
        let mut v = list_of(&["cat", "dog", "cow"]);
        v.set_filter("c").unwrap();
        assert_eq!(v.visible_len(), 2);
        assert!(v.replace_item(1, VisualRow::new("cod")));
        assert_eq!(v.visible_len(), 3);
        assert!(v.replace_item(0, VisualRow::new("ant")));
        assert_eq!(v.visible_len(), 2);
        assert_eq!(v.row(0).map(|r| r.primary.as_str()), Some("cod"));
        assert!(!v.replace_item(9, VisualRow::new("x")));
    }

    #[test]
    fn release_rows_keeps_query_and_clamps_selection() {
        let mut v = list_of(&["a1", "a2", "b"]);
        v.set_filter("a").unwrap();
        v.select_last();
        v.release_rows();
        assert_eq!(v.filter(), Some("a"));
        assert_eq!(v.selected(), None);
        v.replace_rows(vec![VisualRow::new("a3"), VisualRow::new("c")])
            .unwrap();
        assert_eq!(v.visible_len(), 1);
        assert_eq!(v.selected(), Some(0));
    }

    #[test]
    fn windowed_rows_are_addressed_by_global_index() {
        let mut v = ListView::new();
        v.set_total(Some(100));
        v.set_window_start(40);
        v.replace_rows((40..50).map(|i| VisualRow::new(format!("item {i}"))).collect())
            .unwrap();
        assert_eq!(v.visible_len(), 100);
        assert_eq!(v.row(45).map(|r| r.primary.as_str()), Some("item 45"));
        assert!(v.row(39).is_none());
        assert!(v.row(50).is_none());
        v.set_scroll_offset(99);
        assert_eq!(v.scroll_offset(), 99);
    }

    #[test]
    fn render_draws_only_the_visible_slice() {
        let mut v = numbered(10);
        v.set_options(ListViewOptions {
            show_scrollbar: false,
            ..Default::default()
        });
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        v.set_scroll_offset(4);
        v.render(area, &mut buf, &Theme::default());
        assert_eq!(v.visible_count(), 3);
        assert_eq!(line(&buf, 0), "row 4");
        assert_eq!(line(&buf, 2), "row 6");
    }

    #[test]
    fn render_uses_item_height_for_secondary_line() {
        let mut v = ListView::with_options(ListViewOptions {
            item_height: 2,
            show_scrollbar: false,
            ..Default::default()
        });
        v.add_item(VisualRow::new("title").with_secondary("detail").with_icon("*"))
            .unwrap();
        let area = Rect::new(0, 0, 12, 5);
        let mut buf = Buffer::empty(area);
        v.render(area, &mut buf, &Theme::default());
        assert_eq!(v.visible_count(), 2);
        assert_eq!(line(&buf, 0), "* title");
        assert_eq!(line(&buf, 1), "detail");
    }

    #[test]
    fn render_shows_sentinels_for_empty_projection() {
        let area = Rect::new(0, 0, 12, 2);
        let mut v = ListView::new();
        let mut buf = Buffer::empty(area);
        v.render(area, &mut buf, &Theme::default());
        assert_eq!(line(&buf, 0), "No items");

        let mut v = list_of(&["alpha"]);
        v.set_filter("zzz").unwrap();
        let mut buf = Buffer::empty(area);
        v.render(area, &mut buf, &Theme::default());
        assert_eq!(line(&buf, 0), "No matches");
    }

    #[test]
    fn keys_navigate_and_activate() {
        let mut v = numbered(20);
        v.set_visible_count(5);
        assert_eq!(v.handle_event(key(KeyCode::Down)), ListAction::SelectionChanged);
        assert_eq!(v.selected(), Some(1));
        v.handle_event(key(KeyCode::PageDown));
        assert_eq!(v.selected(), Some(6));
        v.handle_event(InputEvent::Key(
            KeyEvent::new(KeyCode::Char('u')).with_modifiers(KeyModifiers::CTRL),
        ));
        assert_eq!(v.selected(), Some(4));
        v.handle_event(key(KeyCode::Char('G')));
        assert_eq!(v.selected(), Some(19));
        assert_eq!(v.scroll_offset(), 15);
        assert_eq!(v.handle_event(key(KeyCode::Enter)), ListAction::Activated(19));
        assert_eq!(v.handle_event(key(KeyCode::Char('x'))), ListAction::None);
    }

    #[test]
    fn mouse_click_selects_and_motion_hovers() {
        let mut v = numbered(10);
        v.set_options(ListViewOptions {
            show_scrollbar: false,
            ..Default::default()
        });
        let area = Rect::new(2, 1, 10, 4);
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 6));
        v.render(area, &mut buf, &Theme::default());

        let click = MouseEvent::new(3, 3, MouseEventKind::Down(MouseButton::Left));
        assert_eq!(
            v.handle_event(InputEvent::Mouse(click)),
            ListAction::SelectionChanged
        );
        assert_eq!(v.selected(), Some(2));

        let hover = MouseEvent::new(3, 4, MouseEventKind::Moved);
        assert_eq!(v.handle_event(InputEvent::Mouse(hover)), ListAction::Redraw);
        assert_eq!(v.hovered(), Some(3));

        let outside = MouseEvent::new(0, 0, MouseEventKind::Moved);
        v.handle_event(InputEvent::Mouse(outside));
        assert_eq!(v.hovered(), None);

        let wheel = MouseEvent::new(3, 3, MouseEventKind::ScrollDown);
        assert_eq!(v.handle_event(InputEvent::Mouse(wheel)), ListAction::Redraw);
        assert_eq!(v.scroll_offset(), 3);
    }

    #[test]
    fn help_lists_navigation_bindings() {
        let help = ListBindings::default().help();
        assert_eq!(help.len(), 4);
        assert!(help[0].matches(&keymap::key_char('j')));
    }
}
