use thiserror::Error;

use crate::model::vocabulary::TokenId;

/// Errors produced by the generation and decoding pipeline.
///
/// # Notes
/// - `ConfigurationMismatch` and `UnknownToken` indicate an unusable
///   model/vocabulary pairing; they abort the current run and must not
///   be retried with the same session.
/// - `UnknownSymbol` is recoverable by rejecting the seed and asking the
///   caller for a different one.
/// - `EmptyMelody` is recoverable by retrying with a different seed or a
///   larger number of steps.
#[derive(Error, Debug)]
pub enum MelodyError {
	/// The model returned a probability vector whose width does not match
	/// the vocabulary size. Fatal for the session.
	#[error("model produced {model} probabilities for a vocabulary of {vocabulary} symbols")]
	ConfigurationMismatch { model: usize, vocabulary: usize },

	/// A seed symbol is absent from the vocabulary.
	#[error("unknown symbol '{0}'")]
	UnknownSymbol(String),

	/// The model sampled a token id that resolves to no symbol.
	/// Fatal for the current generation run.
	#[error("unknown token id {token} (vocabulary holds {vocabulary} symbols)")]
	UnknownToken { token: TokenId, vocabulary: usize },

	/// The decoder was given a melody containing no note or rest event.
	#[error("melody contains no note or rest event")]
	EmptyMelody,

	/// The sampler received a probability vector that cannot be safely
	/// renormalized (all-zero mass, negative or non-finite entries, ...).
	#[error("probability vector cannot be renormalized: {0}")]
	NumericInstability(String),

	/// Sampling temperature must be strictly positive.
	#[error("temperature must be > 0.0, got {0}")]
	InvalidTemperature(f32),

	/// The base step duration handed to the decoder must be strictly positive.
	#[error("base step duration must be > 0.0, got {0}")]
	InvalidStepDuration(f64),

	/// The context window must hold at least one token.
	#[error("max_window must be at least 1, got {0}")]
	InvalidWindow(usize),

	/// The symbol table file could not be read.
	#[error("failed to read symbol table: {0}")]
	Io(#[from] std::io::Error),

	/// The symbol table content is malformed (bad JSON, duplicate token id,
	/// unparseable surface form, missing end-of-sequence sentinel).
	#[error("invalid symbol table: {0}")]
	SymbolTable(String),
}
