//! HTTP handlers, one router per resource.
//!
//! Every content resource shares the handlers in [`content`]; reads are
//! public, writes go through `authenticate_token` then `require_admin`.
pub mod auth;
pub mod content;
pub mod upload;
