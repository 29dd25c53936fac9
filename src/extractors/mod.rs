//! Request extractors.

pub mod json_body;
pub mod state_code;

pub use json_body::JsonBody;
pub use state_code::StateCode;
