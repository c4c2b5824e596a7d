//! Integration tests for `DataListView` against hand-written sources.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datalist_core::DataListView;
use ratatui_datalist_core::DisplayAdapter;
use ratatui_datalist_core::ListAction;
use ratatui_datalist_core::ListDataSource;
use ratatui_datalist_core::ListViewOptions;
use ratatui_datalist_core::SourceError;
use ratatui_datalist_core::SourceState;
use ratatui_datalist_core::VecSource;
use ratatui_datalist_core::VirtualWindowOptions;
use ratatui_datalist_core::VisualRow;
use ratatui_datalist_core::input::InputEvent;
use ratatui_datalist_core::input::KeyCode;
use ratatui_datalist_core::source::ChangeEvent;
use ratatui_datalist_core::source::Observer;
use ratatui_datalist_core::source::ObserverSet;
use ratatui_datalist_core::source::SubscriptionId;
use ratatui_datalist_core::source::dispatch;
use ratatui_datalist_core::theme::Theme;

/// A numbered source that counts subscription calls and can leave holes.
#[derive(Default)]
struct CountingSource {
    len: Cell<usize>,
    holes: RefCell<BTreeSet<usize>>,
    observers: RefCell<ObserverSet<String>>,
    subscribes: Cell<usize>,
    unsubscribes: Cell<usize>,
    gets: Cell<usize>,
    /// Emit `State(Loading)` from inside `get` when a hole is hit.
    loading_on_hole: Cell<bool>,
    /// Emit `Failed` from inside `get` at this index, as a paginating backend would.
    fail_at: Cell<Option<usize>>,
}

impl CountingSource {
    fn with_len(len: usize) -> Self {
        let src = Self::default();
        src.len.set(len);
        src
    }

    fn emit(&self, event: ChangeEvent<String>) {
        let observers = self.observers.borrow().snapshot();
        dispatch(&observers, &event);
    }
}

impl ListDataSource for CountingSource {
    type Item = String;

    fn len(&self) -> usize {
        self.len.get()
    }

    fn get(&self, index: usize) -> Option<String> {
        self.gets.set(self.gets.get() + 1);
        if index >= self.len.get() {
            return None;
        }
        if self.fail_at.get() == Some(index) {
            self.emit(ChangeEvent::Failed {
                error: SourceError::new("backend down"),
            });
            return None;
        }
        if self.holes.borrow().contains(&index) {
            if self.loading_on_hole.get() {
                self.emit(ChangeEvent::State(SourceState::Loading));
            }
            return None;
        }
        Some(format!("item {index}"))
    }

    fn state(&self) -> SourceState {
        SourceState::Ready
    }

    fn subscribe(&self, observer: Observer<String>) -> SubscriptionId {
        self.subscribes.set(self.subscribes.get() + 1);
        self.observers.borrow_mut().insert(observer)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.unsubscribes.set(self.unsubscribes.get() + 1);
        self.observers.borrow_mut().remove(id)
    }
}

fn line(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn no_scrollbar() -> ListViewOptions {
    ListViewOptions {
        show_scrollbar: false,
        ..Default::default()
    }
}

#[test]
fn plain_source_rows_match_items() {
    let src = Rc::new(VecSource::new(vec![
        "alpha".to_string(),
        "beta".to_string(),
        "gamma".to_string(),
    ]));
    let view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
    assert_eq!(view.materialized_len(), 3);
    assert_eq!(view.list().rows()[0].primary, "alpha");
    assert_eq!(view.list().selected(), Some(0));
}

#[test]
fn windowed_source_follows_scroll_offset() {
    let items: Vec<String> = (0..128).map(|i| format!("item {i}")).collect();
    let src = Rc::new(VecSource::new(items));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        ListViewOptions::default(),
        Some(VirtualWindowOptions {
            window_size: 32,
            preload: 8,
            viewport_height: 5,
        }),
    );
    let area = Rect::new(0, 0, 20, 5);
    let theme = Theme::default();

    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &theme);
    assert_eq!(view.window().window_start, 0);
    assert!(view.materialized_len() <= 46);

    view.list_mut().set_scroll_offset(64);
    view.mark_dirty();
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &theme);

    let w = view.window();
    assert!(w.window_start <= 64 && 64 < w.window_end);
    assert!(w.len() <= 32 + 2 * 8);
    let local = 64 - w.window_start;
    assert_eq!(view.list().rows()[local].primary, "item 64");
}

#[test]
fn one_subscribe_and_one_unsubscribe_per_view() {
    let src = Rc::new(CountingSource::with_len(10));
    let mut view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
    assert_eq!(src.subscribes.get(), 1);

    view.detach();
    view.detach();
    drop(view);
    assert_eq!(src.unsubscribes.get(), 1);

    let view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
    drop(view);
    assert_eq!(src.subscribes.get(), 2);
    assert_eq!(src.unsubscribes.get(), 2);
    assert_eq!(src.observers.borrow().len(), 0);
}

#[test]
fn events_after_detach_are_not_delivered() {
    let src = Rc::new(CountingSource::with_len(3));
    let mut view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
    view.detach();
    src.len.set(4);
    src.emit(ChangeEvent::Appended {
        items: vec!["item 3".to_string()],
    });
    assert_eq!(view.materialized_len(), 0);
    assert!(!view.is_registered());
}

#[test]
fn holes_are_skipped_not_fatal() {
    let src = Rc::new(CountingSource::with_len(6));
    src.holes.borrow_mut().extend([1, 4]);
    let view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
    let rows: Vec<String> = view
        .list()
        .rows()
        .iter()
        .map(|r| r.primary.clone())
        .collect();
    assert_eq!(rows, ["item 0", "item 2", "item 3", "item 5"]);
    assert_eq!(view.last_error(), None);
}

#[test]
fn windowed_render_fetches_only_the_window() {
    let src = Rc::new(CountingSource::with_len(1_000_000));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        no_scrollbar(),
        Some(VirtualWindowOptions {
            window_size: 16,
            preload: 4,
            viewport_height: 0,
        }),
    );
    assert_eq!(src.gets.get(), 0);

    let area = Rect::new(0, 0, 20, 10);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(src.gets.get(), 14);
    assert_eq!(line(&buf, 0), "item 0");

    // Nothing changed, nothing is fetched.
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(src.gets.get(), 14);

    view.list_mut().set_selected(Some(999_999));
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(line(&buf, 9), "item 999999");
    assert!(view.materialized_len() <= 24);
}

#[test]
fn events_emitted_during_reload_are_applied_afterwards() {
    let src = Rc::new(CountingSource::with_len(8));
    src.holes.borrow_mut().insert(2);
    src.loading_on_hole.set(true);
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        ListViewOptions::default(),
        Some(VirtualWindowOptions {
            window_size: 8,
            preload: 0,
            viewport_height: 8,
        }),
    );
    view.refresh_window();
    assert_eq!(view.materialized_len(), 7);
    assert_eq!(view.state(), SourceState::Loading);
}

#[test]
fn failure_reported_during_reload_reaches_the_view() {
    let src = Rc::new(CountingSource::with_len(8));
    src.fail_at.set(Some(3));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        no_scrollbar(),
        Some(VirtualWindowOptions {
            window_size: 8,
            preload: 0,
            viewport_height: 0,
        }),
    );
    let area = Rect::new(0, 0, 30, 8);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(view.state(), SourceState::Failed);
    assert_eq!(view.materialized_len(), 0);
    assert_eq!(line(&buf, 0), "Data failed: backend down");

    // Failed views stop reading, so the failure is not re-reported.
    let gets = src.gets.get();
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(src.gets.get(), gets);
    assert_eq!(line(&buf, 0), "Data failed: backend down");
}

#[test]
fn detached_windowed_view_stops_reading() {
    let items: Vec<String> = (0..32).map(|i| format!("item {i}")).collect();
    let src = Rc::new(VecSource::new(items));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        no_scrollbar(),
        Some(VirtualWindowOptions {
            window_size: 8,
            preload: 0,
            viewport_height: 0,
        }),
    );
    let area = Rect::new(0, 0, 20, 8);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(view.materialized_len(), 8);

    view.detach();
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(view.materialized_len(), 0);
    assert_eq!(line(&buf, 0), "No data");

    src.update(0, "changed".to_string());
    view.refresh();
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(view.materialized_len(), 0);
}

#[test]
fn plain_rows_after_a_hole_keep_their_source_index() {
    let src = Rc::new(CountingSource::with_len(4));
    src.holes.borrow_mut().insert(1);
    let mut view = DataListView::new(&src, DisplayAdapter, no_scrollbar(), None);
    assert_eq!(view.materialized_len(), 3);

    src.emit(ChangeEvent::Updated {
        index: 2,
        item: "changed".to_string(),
    });
    src.emit(ChangeEvent::Updated {
        index: 1,
        item: "still a hole".to_string(),
    });
    let rows: Vec<String> = view
        .list()
        .rows()
        .iter()
        .map(|r| r.primary.clone())
        .collect();
    assert_eq!(rows, ["item 0", "changed", "item 3"]);

    view.list_mut().set_selected(Some(1));
    assert_eq!(
        view.handle_event(InputEvent::key(KeyCode::Enter)),
        ListAction::Activated(2)
    );
}

#[test]
fn unbounded_window_options_saturate() {
    let src = Rc::new(CountingSource::with_len(50));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        no_scrollbar(),
        Some(VirtualWindowOptions {
            window_size: usize::MAX,
            preload: usize::MAX,
            viewport_height: 0,
        }),
    );
    assert_eq!(view.window().max_rows(), usize::MAX);

    let area = Rect::new(0, 0, 20, 10);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    let w = view.window();
    assert_eq!((w.window_start, w.window_end), (0, 50));
    assert_eq!(view.materialized_len(), 50);

    view.list_mut().set_selected(Some(49));
    view.refresh_window();
    let w = view.window();
    assert_eq!((w.window_start, w.window_end), (0, 50));
    assert_eq!(line(&buf, 0), "item 0");
}

#[test]
fn appends_extend_a_streaming_list() {
    let src = Rc::new(VecSource::with_state(Vec::<u32>::new(), SourceState::Loading));
    let view = DataListView::new(
        &src,
        |n: &u32, index: usize| {
            VisualRow::new(format!("#{n}")).with_secondary(format!("row {index}"))
        },
        ListViewOptions::default(),
        None,
    );
    src.extend([1, 2]);
    src.extend([3]);
    src.set_state(SourceState::Exhausted);

    let list = view.list();
    assert_eq!(list.len(), 3);
    assert_eq!(list.rows()[2].primary, "#3");
    assert_eq!(list.rows()[2].secondary.as_deref(), Some("row 2"));
    drop(list);
    assert_eq!(view.state(), SourceState::Exhausted);
}

#[test]
fn filtered_windowed_list_keeps_its_anchor() {
    let items: Vec<String> = (0..100).map(|i| format!("item {i}")).collect();
    let src = Rc::new(VecSource::new(items));
    let mut view = DataListView::new(
        &src,
        DisplayAdapter,
        no_scrollbar(),
        Some(VirtualWindowOptions {
            window_size: 20,
            preload: 0,
            viewport_height: 20,
        }),
    );
    view.list_mut().set_scroll_offset(40);
    view.refresh_window();
    assert_eq!(view.window().window_start, 40);

    view.set_filter("7").unwrap();
    assert_eq!(view.list().visible_len(), 2);
    let area = Rect::new(0, 0, 20, 20);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf, &Theme::default());
    assert_eq!(view.window().window_start, 40);
    assert_eq!(line(&buf, 0), "item 47");
    assert_eq!(line(&buf, 1), "item 57");
    assert_eq!(view.list().source_index(1), Some(57));
}
