//! Safe SQL building: fixed identifiers in code, every client value bound as a positional parameter.

mod builder;
pub mod params;
mod update;
pub use builder::*;
pub use params::*;
pub use update::*;
