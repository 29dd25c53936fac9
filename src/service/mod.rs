//! Fun-fact merge layer and request validation.

pub mod funfacts;
pub mod validation;

pub use funfacts::{DuplicatePolicy, FactService, MergedStateView};
pub use validation::{AddFactsRequest, DeleteFactRequest, RequestValidator, UpdateFactRequest};
