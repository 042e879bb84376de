//! Command implementations
//!
//! One file per user-facing command, each written as an `impl Repository`
//! block (or a free function where no repository exists yet, as for `clone`
//! and `serve`). The CLI front-end in `main.rs` only parses arguments and
//! dispatches here.

pub mod porcelain;
