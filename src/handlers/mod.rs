//! HTTP handlers for the states catalog and fun facts.

pub mod funfacts;
pub mod states;
pub use funfacts::*;
pub use states::*;
