//! `ratatui-datalist-core` provides list widgets for terminal UIs that stay in sync with live,
//! possibly huge, data sources.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - Single-threaded: sources notify observers synchronously on the thread that mutated them.
//! - Bounded memory: windowed lists materialize at most `window_size + 2 * preload` rows no
//!   matter how many items the source holds.
//! - Rendering never fails: allocation and source errors are recorded and shown as a status line.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-datalist`. Use this crate directly if
//! you only need the primitives.
//!
//! Useful entry points:
//! - [`data_list::DataListView`]: a list bound to a [`source::ListDataSource`].
//! - [`list_view::ListView`]: the underlying scrollable/selectable/filterable row list.
//! - [`memory::VecSource`]: an in-memory source that emits change events on mutation.
//! - [`adapter::RowAdapter`]: how items become [`row::VisualRow`]s.
//!
//! ## Logging
//!
//! Enable the `tracing` feature to get events under the `ratatui_datalist` target: window
//! reloads and subscriptions at `debug`, per-event and hole diagnostics at `trace`, and dropped
//! rows or source failures at `warn`.
#[macro_use]
mod macros;

pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod viewport;

pub mod help;
pub mod input;
pub mod keymap;

pub mod error;
pub mod source;

pub mod adapter;
pub mod memory;
pub mod row;

pub mod data_list;
pub mod list_view;

pub use adapter::DisplayAdapter;
pub use adapter::RowAdapter;
pub use data_list::DataListView;
pub use data_list::VirtualWindowOptions;
pub use data_list::WindowState;
pub use error::DataListError;
pub use error::SourceError;
pub use list_view::ListAction;
pub use list_view::ListView;
pub use list_view::ListViewOptions;
pub use memory::VecSource;
pub use row::VisualRow;
pub use source::ChangeEvent;
pub use source::ListDataSource;
pub use source::SourceState;
