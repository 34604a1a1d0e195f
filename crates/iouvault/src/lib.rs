//! iouvault - durable store for iou obligation records.
//!
//! the binary wraps the storage layer with config loading, logging and
//! subcommands for operators; see [`cli`].

pub mod cli;
