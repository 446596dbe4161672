//! `hb-cli`: manage hospital blog articles against a running API.
//!
//! The binary keeps its command modules private; this library target only
//! exposes the Markdown helpers so they can be tested on their own.

pub mod utils;
