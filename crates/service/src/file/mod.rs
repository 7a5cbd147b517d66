//! File-backed store implementations.

pub mod request_store;
