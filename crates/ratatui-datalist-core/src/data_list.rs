//! A [`ListView`] bound to a live [`ListDataSource`].
//!
//! [`DataListView`] subscribes to a source, converts items into [`VisualRow`]s through a
//! [`RowAdapter`], and keeps the list in sync with every [`ChangeEvent`] the source emits.
//!
//! Two modes are supported:
//!
//! - **Plain**: every item is materialized. Events patch rows incrementally.
//! - **Windowed** (`Some(VirtualWindowOptions)`): only a neighbourhood of the scroll position is
//!   materialized, bounded by `window_size + 2 * preload` rows no matter how large the source
//!   is. Events only mark the window dirty; the next [`DataListView::render`] reloads it.
//!
//! ## Lifetime contract
//!
//! The source is owned by the caller. The view keeps a [`Weak`] handle to it and unsubscribes
//! exactly once, either through [`DataListView::detach`] or on drop. A source dropped first
//! simply stops delivering events; the view then renders what it has.
//!
//! ## Re-entrancy
//!
//! Events are delivered synchronously. If a source emits while the view is busy (e.g. from
//! inside `get` during a window reload) the event is queued and applied as soon as the view is
//! free again. Queued data events do not keep their items; they collapse into a resync.
//!
//! A detached view no longer reads from its source: `render` draws whatever is left (nothing,
//! after [`DataListView::detach`]).
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::rc::Rc;
use std::rc::Weak;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::adapter::RowAdapter;
use crate::error::DataListError;
use crate::error::SourceError;
use crate::input::InputEvent;
use crate::list_view::ListAction;
use crate::list_view::ListView;
use crate::list_view::ListViewOptions;
use crate::render;
use crate::row::VisualRow;
use crate::source::ChangeEvent;
use crate::source::ListDataSource;
use crate::source::Observer;
use crate::source::SourceState;
use crate::source::SubscriptionId;
use crate::theme::Theme;

/// Window size used when [`VirtualWindowOptions::window_size`] is zero.
pub const DEFAULT_WINDOW_SIZE: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualWindowOptions {
    /// Rows kept around the viewport. `0` means [`DEFAULT_WINDOW_SIZE`].
    pub window_size: usize,
    /// Extra rows materialized on each side of the viewport.
    pub preload: usize,
    /// Viewport height used by [`DataListView::refresh_window`]. `0` falls back to
    /// `window_size` rows. `render` always uses the height of the area it draws into.
    pub viewport_height: u16,
}

impl Default for VirtualWindowOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            preload: 0,
            viewport_height: 0,
        }
    }
}

/// Snapshot of the materialized window. Only meaningful when `enabled`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowState {
    pub enabled: bool,
    pub window_size: usize,
    pub preload: usize,
    pub window_start: usize,
    pub window_end: usize,
    pub dirty: bool,
}

impl WindowState {
    fn from_options(options: Option<VirtualWindowOptions>) -> Self {
        match options {
            None => Self::default(),
            Some(o) => Self {
                enabled: true,
                window_size: if o.window_size == 0 {
                    DEFAULT_WINDOW_SIZE
                } else {
                    o.window_size
                },
                preload: o.preload,
                window_start: 0,
                window_end: 0,
                dirty: true,
            },
        }
    }

    /// Upper bound on materialized rows: `window_size + 2 * preload`, saturating.
    pub fn max_rows(&self) -> usize {
        self.window_size
            .saturating_add(self.preload.saturating_mul(2))
            .max(1)
    }

    pub fn len(&self) -> usize {
        self.window_end - self.window_start
    }

    pub fn is_empty(&self) -> bool {
        self.window_end == self.window_start
    }
}

/// An event that reached the view while it was busy.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Deferred {
    Reset,
    /// Appended, replaced or updated; the payload is re-read from the source.
    Changed,
    Failed(SourceError),
    State(SourceState),
}

impl Deferred {
    fn from_event<T>(event: &ChangeEvent<T>) -> Self {
        match event {
            ChangeEvent::Reset => Self::Reset,
            ChangeEvent::Appended { .. }
            | ChangeEvent::Replaced { .. }
            | ChangeEvent::Updated { .. } => Self::Changed,
            ChangeEvent::Failed { error } => Self::Failed(error.clone()),
            ChangeEvent::State(state) => Self::State(*state),
        }
    }
}

type DeferredQueue = Rc<RefCell<VecDeque<Deferred>>>;

struct Engine<T, A> {
    list: ListView,
    adapter: A,
    window: WindowState,
    viewport_height: u16,
    state: SourceState,
    error: Option<DataListError>,
    /// Source index of each materialized row of a plain list, ascending. Differs from the row
    /// position once a hole was skipped.
    row_sources: Vec<usize>,
    detached: bool,
    _item: PhantomData<fn(&T)>,
}

impl<T, A: RowAdapter<T>> Engine<T, A> {
    fn on_event<S>(&mut self, event: &ChangeEvent<T>, source: Option<&S>)
    where
        S: ListDataSource<Item = T>,
    {
        dl_trace!(
            kind = event.kind(),
            windowed = self.window.enabled,
            "source event"
        );
        let windowed = self.window.enabled;
        match event {
            ChangeEvent::Reset => {
                self.list.clear();
                self.row_sources.clear();
                if windowed {
                    self.window.dirty = true;
                    self.sync_total(source);
                } else if let Some(source) = source {
                    self.refresh_all(source);
                }
            }
            ChangeEvent::Appended { items } => {
                if windowed {
                    self.window.dirty = true;
                    self.sync_total(source);
                } else {
                    let first = source
                        .map(|s| s.len().saturating_sub(items.len()))
                        .unwrap_or_else(|| self.list.len());
                    self.append(first, items);
                }
            }
            ChangeEvent::Replaced { range, items } => {
                if windowed {
                    self.window.dirty = true;
                } else {
                    for (index, item) in range.clone().zip(items) {
                        self.replace(index, item);
                    }
                }
            }
            ChangeEvent::Updated { index, item } => {
                if windowed {
                    self.window.dirty = true;
                } else {
                    self.replace(*index, item);
                }
            }
            ChangeEvent::Failed { error } => {
                dl_warn!(error = %error, "data source failed");
                self.error = Some(DataListError::Source(error.clone()));
                self.state = SourceState::Failed;
                self.list.release_rows();
                self.row_sources.clear();
                if windowed {
                    self.window.window_end = self.window.window_start;
                    self.sync_total(source);
                }
            }
            ChangeEvent::State(state) => {
                self.state = *state;
                if *state != SourceState::Failed
                    && matches!(self.error, Some(DataListError::Source(_)))
                {
                    self.error = None;
                }
                if windowed {
                    self.sync_total(source);
                    self.window.dirty = true;
                } else if *state == SourceState::Ready
                    && self.list.is_empty()
                    && let Some(source) = source
                {
                    self.refresh_all(source);
                }
            }
        }
    }

    /// Adapts `items` as source indices `first..`. Stops at the first failure and drops the
    /// rest of the batch.
    fn append(&mut self, first: usize, items: &[T]) {
        for (offset, item) in items.iter().enumerate() {
            let index = first + offset;
            let added = self
                .adapter
                .build_row(item, index)
                .and_then(|row| self.list.add_item(row));
            match added {
                Ok(()) => self.row_sources.push(index),
                Err(err) => {
                    dl_warn!(
                        index,
                        dropped = items.len() - offset,
                        error = %err,
                        "append stopped; rest of batch dropped"
                    );
                    self.error = Some(err);
                    break;
                }
            }
        }
    }

    /// Rebuilds the row holding source index `index`. Items that were holes at refresh time have
    /// no row and are ignored until the next refresh.
    fn replace(&mut self, index: usize, item: &T) {
        let Ok(row_index) = self.row_sources.binary_search(&index) else {
            return;
        };
        match self.adapter.build_row(item, index) {
            Ok(row) => {
                self.list.replace_item(row_index, row);
            }
            Err(err) => {
                dl_warn!(index, error = %err, "row replacement skipped");
                self.error = Some(err);
            }
        }
    }

    /// Fetches and adapts `range`, skipping holes and rows that fail to build. Returns the rows
    /// and the source index of each.
    fn materialize<S>(
        &mut self,
        source: &S,
        range: std::ops::Range<usize>,
    ) -> (Vec<VisualRow>, Vec<usize>)
    where
        S: ListDataSource<Item = T>,
    {
        let mut rows = Vec::new();
        let mut indices = Vec::new();
        for index in range {
            let Some(item) = source.get(index) else {
                dl_trace!(index, "hole skipped");
                continue;
            };
            let row = match self.adapter.build_row(&item, index) {
                Ok(row) => row,
                Err(err) => {
                    dl_warn!(index, error = %err, "row skipped");
                    self.error = Some(err);
                    continue;
                }
            };
            if let Err(e) = rows.try_reserve(1).and_then(|()| indices.try_reserve(1)) {
                self.error = Some(DataListError::allocation(index, e));
                continue;
            }
            rows.push(row);
            indices.push(index);
        }
        (rows, indices)
    }

    fn store_rows(&mut self, rows: Vec<VisualRow>) {
        if let Err(err) = self.list.replace_rows(rows) {
            self.error = Some(err);
        }
    }

    /// Materializes every item of a plain list.
    fn refresh_all<S>(&mut self, source: &S)
    where
        S: ListDataSource<Item = T>,
    {
        let len = source.len();
        dl_debug!(len, "full refresh");
        self.list.release_rows();
        let (rows, indices) = self.materialize(source, 0..len);
        self.row_sources = indices;
        self.store_rows(rows);
    }

    fn sync_total<S>(&mut self, source: Option<&S>)
    where
        S: ListDataSource<Item = T>,
    {
        let total = source.map_or(0, |s| s.len());
        self.list.set_total(Some(total));
        if self.window.window_end > total {
            self.window.window_end = total;
            self.window.window_start = self.window.window_start.min(total);
            self.window.dirty = true;
        }
    }

    /// Recomputes the window around the scroll offset and reloads it when stale.
    fn ensure_window<S>(&mut self, source: &S, viewport_height: u16)
    where
        S: ListDataSource<Item = T>,
    {
        let total = source.len();
        self.list.set_total(Some(total));
        if total == 0 {
            self.list.release_rows();
            self.list.set_window_start(0);
            self.window.window_start = 0;
            self.window.window_end = 0;
            self.window.dirty = false;
            return;
        }

        let item_height = self.list.item_height();
        let viewport_rows = if viewport_height == 0 {
            self.window.window_size
        } else {
            (viewport_height as usize / item_height).max(1)
        };
        let preload = self.window.preload;
        // A filtered projection is local to the window, so keep the window where it is.
        let anchor = if self.list.filter().is_some() {
            self.window
                .window_start
                .saturating_add(preload)
                .min(total - 1)
        } else {
            self.list.scroll_offset()
        };

        let start = anchor.saturating_sub(preload);
        let mut end = anchor
            .saturating_add(viewport_rows)
            .saturating_add(preload)
            .min(total)
            .max(start);
        let max_window = self.window.max_rows().min(total).max(1);
        if end - start > max_window {
            end = start.saturating_add(max_window).min(total);
        }

        let materialized = self.list.len();
        let needs_reload = self.window.dirty
            || start < self.window.window_start
            || end > self.window.window_end
            || materialized < end - start;
        if !needs_reload {
            return;
        }

        dl_debug!(
            start,
            end,
            total,
            dirty = self.window.dirty,
            "reloading window"
        );
        let (rows, _) = self.materialize(source, start..end);
        self.list.set_window_start(start);
        self.store_rows(rows);
        self.window.window_start = start;
        self.window.window_end = end;
        self.window.dirty = false;
    }

    fn apply_deferred<S>(&mut self, event: Deferred, source: Option<&S>)
    where
        S: ListDataSource<Item = T>,
    {
        match event {
            Deferred::Reset => self.on_event(&ChangeEvent::Reset, source),
            Deferred::Changed if self.window.enabled => {
                self.window.dirty = true;
                self.sync_total(source);
            }
            Deferred::Changed => {
                if let Some(source) = source {
                    self.refresh_all(source);
                }
            }
            Deferred::Failed(error) => self.on_event(&ChangeEvent::Failed { error }, source),
            Deferred::State(state) => self.on_event(&ChangeEvent::State(state), source),
        }
    }

    /// Reloads the window when needed. Nothing is read from a failed or detached source.
    fn prepare<S>(&mut self, viewport_height: u16, source: Option<&S>)
    where
        S: ListDataSource<Item = T>,
    {
        if self.state == SourceState::Failed || self.detached {
            return;
        }
        match source {
            Some(source) if self.window.enabled => self.ensure_window(source, viewport_height),
            Some(_) => {}
            None => {
                dl_warn!("data source dropped; rendering cached rows");
            }
        }
    }

    fn draw(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if self.state == SourceState::Failed {
            if !self.list.is_empty() {
                self.list.release_rows();
                self.row_sources.clear();
            }
            let reason = match &self.error {
                Some(DataListError::Source(e)) => e.to_string(),
                Some(other) => other.to_string(),
                None => "unknown error".to_string(),
            };
            status_line(area, buf, &format!("Data failed: {reason}"), theme.danger);
            return;
        }

        let nothing_to_show = self.list.visible_len() == 0 && self.list.filter().is_none();
        if nothing_to_show && self.state == SourceState::Loading {
            status_line(area, buf, "Loading…", theme.text_muted);
        } else if nothing_to_show {
            status_line(area, buf, "No data", theme.text_muted);
        } else {
            self.list.render(area, buf, theme);
        }
    }
}

fn status_line(area: Rect, buf: &mut Buffer, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    buf.set_style(area, Style::default());
    render::render_str_clipped(area.x, area.y, 0, area.width, buf, text, style);
}

/// A list view kept in sync with a [`ListDataSource`].
pub struct DataListView<S, A>
where
    S: ListDataSource + 'static,
    A: RowAdapter<S::Item> + 'static,
{
    source: Weak<S>,
    engine: Rc<RefCell<Engine<S::Item, A>>>,
    deferred: DeferredQueue,
    subscription: Option<SubscriptionId>,
}

impl<S, A> DataListView<S, A>
where
    S: ListDataSource + 'static,
    S::Item: 'static,
    A: RowAdapter<S::Item> + 'static,
{
    /// Binds a new view to `source`.
    ///
    /// Plain lists materialize every item right away. Windowed lists only record the total;
    /// rows are fetched by the first [`render`](Self::render) or
    /// [`refresh_window`](Self::refresh_window).
    pub fn new(
        source: &Rc<S>,
        adapter: A,
        options: ListViewOptions,
        window: Option<VirtualWindowOptions>,
    ) -> Self {
        let mut list = ListView::with_options(options);
        let viewport_height = window.map_or(0, |w| w.viewport_height);
        if viewport_height > 0 {
            list.set_visible_count(viewport_height as usize / list.item_height());
        }
        let engine = Rc::new(RefCell::new(Engine {
            list,
            adapter,
            window: WindowState::from_options(window),
            viewport_height,
            state: source.state(),
            error: None,
            row_sources: Vec::new(),
            detached: false,
            _item: PhantomData,
        }));
        let deferred = DeferredQueue::default();

        let observer = Self::observer(
            Rc::downgrade(&engine),
            Rc::downgrade(source),
            Rc::clone(&deferred),
        );
        let id = source.subscribe(observer);
        dl_debug!(
            subscription = id.get(),
            windowed = window.is_some(),
            "subscribed to data source"
        );

        {
            let mut engine = engine.borrow_mut();
            if engine.window.enabled {
                engine.list.set_total(Some(source.len()));
            } else {
                engine.refresh_all(source.as_ref());
            }
        }

        let view = Self {
            source: Rc::downgrade(source),
            engine,
            deferred,
            subscription: Some(id),
        };
        view.drain_deferred();
        view
    }

    fn observer(
        engine: Weak<RefCell<Engine<S::Item, A>>>,
        source: Weak<S>,
        deferred: DeferredQueue,
    ) -> Observer<S::Item> {
        Rc::new(move |event: &ChangeEvent<S::Item>| {
            let Some(engine) = engine.upgrade() else {
                return;
            };
            let Ok(mut engine) = engine.try_borrow_mut() else {
                dl_debug!(kind = event.kind(), "view busy; source event deferred");
                deferred.borrow_mut().push_back(Deferred::from_event(event));
                return;
            };
            let source = source.upgrade();
            engine.on_event(event, source.as_deref());
        })
    }

    /// The source, unless it was dropped or the view was detached.
    fn live_source(&self) -> Option<Rc<S>> {
        if self.subscription.is_none() {
            return None;
        }
        self.source.upgrade()
    }

    /// Applies events queued while the engine was busy. Events queued by this pass wait for the
    /// next one.
    fn drain_deferred(&self) {
        let batch: Vec<Deferred> = self.deferred.borrow_mut().drain(..).collect();
        if batch.is_empty() {
            return;
        }
        let source = self.live_source();
        let mut engine = self.engine.borrow_mut();
        for event in batch {
            engine.apply_deferred(event, source.as_deref());
        }
    }

    /// Draws the list, reloading the window first when needed. Never fails: problems show up
    /// as a status line instead of rows.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let source = self.live_source();
        self.engine
            .borrow_mut()
            .prepare(area.height, source.as_deref());
        self.drain_deferred();
        self.engine.borrow_mut().draw(area, buf, theme);
    }

    /// Brings the window in line with the scroll position using the configured viewport height,
    /// without drawing. No-op for plain lists, failed sources and detached views.
    pub fn refresh_window(&mut self) {
        let Some(source) = self.live_source() else {
            return;
        };
        {
            let mut engine = self.engine.borrow_mut();
            if !engine.window.enabled {
                return;
            }
            let height = engine.viewport_height;
            engine.prepare(height, Some(source.as_ref()));
        }
        self.drain_deferred();
    }

    /// Re-reads the source. Plain lists are rebuilt immediately; windowed lists reload their
    /// window.
    pub fn refresh(&mut self) {
        if self.engine.borrow().window.enabled {
            self.mark_dirty();
            self.refresh_window();
            return;
        }
        if let Some(source) = self.live_source() {
            self.engine.borrow_mut().refresh_all(source.as_ref());
            self.drain_deferred();
        }
    }

    /// Forces the next render to reload the window.
    pub fn mark_dirty(&mut self) {
        self.engine.borrow_mut().window.dirty = true;
    }

    /// Unsubscribes from the source and releases every row. Safe to call more than once.
    pub fn detach(&mut self) {
        let Some(id) = self.subscription.take() else {
            return;
        };
        if let Some(source) = self.source.upgrade()
            && !source.unsubscribe(id)
        {
            dl_debug!(subscription = id.get(), "subscription already removed");
        }
        dl_debug!(subscription = id.get(), "detached from data source");
        self.deferred.borrow_mut().clear();
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.detached = true;
            engine.list.clear();
            engine.row_sources.clear();
            if engine.window.enabled {
                engine.list.set_total(Some(0));
            }
            engine.window.window_start = 0;
            engine.window.window_end = 0;
        }
    }

    pub fn is_registered(&self) -> bool {
        self.subscription.is_some()
    }

    /// Forwards input to the list. `Activated` carries the source index of the row.
    pub fn handle_event(&mut self, event: InputEvent) -> ListAction {
        let mut engine = self.engine.borrow_mut();
        match engine.list.handle_event(event) {
            ListAction::Activated(row) if !engine.window.enabled => ListAction::Activated(
                engine.row_sources.get(row).copied().unwrap_or(row),
            ),
            action => action,
        }
    }

    pub fn set_filter(&mut self, query: &str) -> Result<(), DataListError> {
        self.engine.borrow_mut().list.set_filter(query)
    }

    pub fn list(&self) -> Ref<'_, ListView> {
        Ref::map(self.engine.borrow(), |e| &e.list)
    }

    pub fn list_mut(&mut self) -> RefMut<'_, ListView> {
        RefMut::map(self.engine.borrow_mut(), |e| &mut e.list)
    }

    pub fn materialized_len(&self) -> usize {
        self.engine.borrow().list.len()
    }

    pub fn state(&self) -> SourceState {
        self.engine.borrow().state
    }

    /// The most recent error, kept for display until cleared.
    pub fn last_error(&self) -> Option<DataListError> {
        self.engine.borrow().error.clone()
    }

    pub fn clear_error(&mut self) {
        self.engine.borrow_mut().error = None;
    }

    pub fn window(&self) -> WindowState {
        self.engine.borrow().window
    }
}

impl<S, A> Drop for DataListView<S, A>
where
    S: ListDataSource + 'static,
    A: RowAdapter<S::Item> + 'static,
{
    fn drop(&mut self) {
        let Some(id) = self.subscription.take() else {
            return;
        };
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(id);
        }
    }
}

impl<S, A> std::fmt::Debug for DataListView<S, A>
where
    S: ListDataSource + 'static,
    A: RowAdapter<S::Item> + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let engine = self.engine.try_borrow();
        let mut d = f.debug_struct("DataListView");
        d.field("subscription", &self.subscription);
        if let Ok(engine) = engine {
            d.field("state", &engine.state)
                .field("window", &engine.window)
                .field("rows", &engine.list.len());
        }
        d.finish()
    }
}
