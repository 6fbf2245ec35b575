//! Crate-internal scenario tests
//!
//! `http_api` drives the router in-process; `cluster` runs real nodes on
//! loopback listeners and checks that they converge.

mod http_api;
