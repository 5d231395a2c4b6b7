//! HTTP middleware: request ID.

pub mod request_id;
