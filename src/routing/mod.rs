//! Framework-independent route table for module handlers.

mod pattern;
mod registry;
pub use pattern::{split_path, RoutePattern, Segment};
pub use registry::{RouteTable, RouteTableBuilder};
