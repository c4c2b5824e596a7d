//! `ratatui-datalist` binds ratatui list views to live data sources.
//!
//! This is the facade crate: it re-exports [`ratatui_datalist_core`] under one name so apps
//! only need a single dependency. Enable the `crossterm` feature for event conversion and
//! `tracing` for diagnostics.
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use ratatui_datalist::DataListView;
//! use ratatui_datalist::DisplayAdapter;
//! use ratatui_datalist::ListViewOptions;
//! use ratatui_datalist::VecSource;
//! use ratatui_datalist::VirtualWindowOptions;
//!
//! let source = Rc::new(VecSource::new((0..1_000_000u32).collect()));
//! let mut view = DataListView::new(
//!     &source,
//!     DisplayAdapter,
//!     ListViewOptions::default(),
//!     Some(VirtualWindowOptions::default()),
//! );
//! view.refresh_window();
//! source.push(1_000_000);
//! ```
pub use ratatui_datalist_core::*;
