#[cfg(feature = "tracing")]
macro_rules! dl_trace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "ratatui_datalist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dl_trace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! dl_debug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "ratatui_datalist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dl_debug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! dl_warn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "ratatui_datalist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dl_warn {
    ($($tt:tt)*) => {};
}
