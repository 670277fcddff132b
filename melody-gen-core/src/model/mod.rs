//! Top-level module for the melody generation system.
//!
//! This crate provides an autoregressive melody generator, including:
//! - A bidirectional symbol/token vocabulary (`Vocabulary`)
//! - Temperature-controlled sampling (`sampler`)
//! - Internal sliding-window context management (`SequenceContext`)
//! - Generation configuration (`GenerationInput`)
//! - The generation session (`MelodyGenerator`) and model contract
//!   (`SequenceModel`)
//! - A run-length decoder producing timed events (`decoder`)

/// High-level session interface for generating melodies.
///
/// Exposes the external model contract, the generation loop and the
/// resulting `Melody` value object.
pub mod generator;

/// Fixed, bidirectional mapping between surface symbols and token ids.
///
/// Loaded once from a persisted symbol table, immutable thereafter,
/// shared read-only by all other components.
pub mod vocabulary;

/// Pure temperature-controlled sampling over probability vectors.
pub mod sampler;

/// Run-length decoder collapsing hold markers into event durations.
pub mod decoder;

/// Generation parameters (seed, step count, window size, temperature).
///
/// Used by `MelodyGenerator`.
pub mod generation_input;

/// Internal sliding window of token ids fed to the model.
///
/// Owned and mutated only by the generator. This module is not exposed
/// publicly.
mod context;
