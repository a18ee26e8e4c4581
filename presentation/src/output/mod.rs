//! Output formatting for planning results

pub mod console;
