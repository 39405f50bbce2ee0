//! Request and response bodies for the relay's HTTP surface.

pub mod ask;

pub use ask::{AskRequest, AskResponse, ErrorResponse};
