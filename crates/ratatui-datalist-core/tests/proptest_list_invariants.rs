//! Property-based invariant tests for bound lists.
//!
//! 1. A plain list mirrors its source after any sequence of mutations.
//! 2. A windowed list always covers the scroll offset and never exceeds its row budget.
//! 3. Filtering keeps exactly the matching rows, in source order.

use std::rc::Rc;

use proptest::prelude::*;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datalist_core::DataListView;
use ratatui_datalist_core::DisplayAdapter;
use ratatui_datalist_core::ListDataSource;
use ratatui_datalist_core::ListView;
use ratatui_datalist_core::ListViewOptions;
use ratatui_datalist_core::VecSource;
use ratatui_datalist_core::VirtualWindowOptions;
use ratatui_datalist_core::VisualRow;
use ratatui_datalist_core::theme::Theme;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Mutation {
    Reset(Vec<u16>),
    Append(Vec<u16>),
    Replace { start: usize, items: Vec<u16> },
    Update { index: usize, value: u16 },
}

fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        prop::collection::vec(any::<u16>(), 0..20).prop_map(Mutation::Reset),
        prop::collection::vec(any::<u16>(), 0..10).prop_map(Mutation::Append),
        (0usize..30, prop::collection::vec(any::<u16>(), 0..5))
            .prop_map(|(start, items)| Mutation::Replace { start, items }),
        (0usize..30, any::<u16>()).prop_map(|(index, value)| Mutation::Update { index, value }),
    ]
}

fn apply(src: &VecSource<u16>, mutation: Mutation) {
    match mutation {
        Mutation::Reset(items) => src.reset(items),
        Mutation::Append(items) => src.extend(items),
        Mutation::Replace { start, items } => {
            let end = start + items.len();
            src.replace(start..end, items);
        }
        Mutation::Update { index, value } => {
            src.update(index, value);
        }
    }
}

fn word_strategy() -> impl Strategy<Value = String> {
    "[abc]{0,4}"
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Plain lists mirror the source
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plain_rows_mirror_source(
        initial in prop::collection::vec(any::<u16>(), 0..20),
        mutations in prop::collection::vec(mutation_strategy(), 0..24),
    ) {
        let src = Rc::new(VecSource::new(initial));
        let view = DataListView::new(&src, DisplayAdapter, ListViewOptions::default(), None);
        for mutation in mutations {
            apply(&src, mutation);
            prop_assert_eq!(view.materialized_len(), src.len());
        }
        let expected: Vec<String> = src.to_vec().iter().map(u16::to_string).collect();
        let actual: Vec<String> = view.list().rows().iter().map(|r| r.primary.clone()).collect();
        prop_assert_eq!(actual, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Windowed lists cover the scroll offset within budget
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn window_covers_scroll_offset(
        total in 1usize..5_000,
        window_size in 0usize..64,
        preload in 0usize..16,
        height in 1u16..40,
        scrolls in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let items: Vec<u32> = (0..total as u32).collect();
        let src = Rc::new(VecSource::new(items));
        let mut view = DataListView::new(
            &src,
            DisplayAdapter,
            ListViewOptions::default(),
            Some(VirtualWindowOptions { window_size, preload, viewport_height: 0 }),
        );
        let area = Rect::new(0, 0, 12, height);
        let theme = Theme::default();
        for scroll in scrolls {
            view.list_mut().set_scroll_offset(scroll % total);
            let mut buf = Buffer::empty(area);
            view.render(area, &mut buf, &theme);

            let w = view.window();
            let offset = view.list().scroll_offset();
            prop_assert!(w.window_start <= offset && offset < w.window_end,
                "offset {} outside {}..{}", offset, w.window_start, w.window_end);
            prop_assert!(w.len() <= w.max_rows());
            prop_assert_eq!(view.materialized_len(), w.len());
            prop_assert_eq!(
                view.list().row(offset).map(|r| r.primary.clone()),
                Some(offset.to_string())
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Filtering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn filter_keeps_matching_rows_in_order(
        words in prop::collection::vec(word_strategy(), 0..30),
        query in "[abc]{0,2}",
    ) {
        let mut list = ListView::new();
        for w in &words {
            list.add_item(VisualRow::new(w.as_str())).unwrap();
        }
        list.set_filter(&query).unwrap();

        let expected: Vec<&str> = words
            .iter()
            .map(String::as_str)
            .filter(|w| w.contains(query.as_str()))
            .collect();
        let visible: Vec<&str> = (0..list.visible_len())
            .filter_map(|i| list.row(i).map(|r| r.primary.as_str()))
            .collect();
        prop_assert_eq!(visible, expected);

        list.set_filter("").unwrap();
        prop_assert_eq!(list.visible_len(), words.len());
    }
}
