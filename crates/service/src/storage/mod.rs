//! Storage abstractions for service layer
//!
//! Reusable file-backed containers for services that persist small
//! collections as a single JSON document.

pub mod json_list_store;
