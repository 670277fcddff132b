//! Symbolic melody generation library.
//!
//! This crate provides an autoregressive melody generation core including:
//! - A fixed symbol/token vocabulary loaded from a persisted symbol table
//! - Temperature-controlled stochastic sampling
//! - A sliding-window generation loop driven by an external sequence model
//! - A run-length decoder turning symbol streams into timed note/rest events
//!
//! The trained sequence model itself is an external collaborator: it is only
//! specified through the `SequenceModel` contract and never loaded here.

/// Generation pipeline: vocabulary, sampling, generation loop and decoding.
///
/// This module exposes the high-level session interface while keeping
/// internal context management private.
pub mod model;

/// Error taxonomy shared across the whole pipeline.
///
/// None of these errors are retried internally; each one is a local
/// precondition violation propagated to the caller.
pub mod error;

/// I/O utilities (file loading, path helpers).
pub mod io;
