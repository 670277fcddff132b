use std::fmt;
use std::sync::Arc;

use crate::error::MelodyError;
use crate::model::context::SequenceContext;
use crate::model::generation_input::GenerationInput;
use crate::model::sampler;
use crate::model::vocabulary::{Symbol, TokenId, Vocabulary};

/// Contract with the external trained sequence model.
///
/// The model receives the trailing context window (always exactly
/// `max_window` ids, padded with end-of-sequence ids when the true history
/// is shorter) and returns one normalized probability vector over the full
/// vocabulary.
///
/// # Notes
/// - The output length must equal the vocabulary size; any deviation is a
///   fatal configuration error, surfaced immediately and never retried.
/// - The call is synchronous. Callers wanting responsiveness run a whole
///   `generate` invocation on a worker thread rather than interleave steps.
/// - Concurrent generation runs query the model concurrently; supporting
///   that is the model's responsibility, not enforced here.
pub trait SequenceModel {
	/// Predicts the next-token distribution for the given window.
	fn predict(&self, window: &[TokenId]) -> Result<Vec<f32>, MelodyError>;
}

/// How a generation run came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	/// The model sampled the end-of-sequence sentinel.
	EndOfSequence,
	/// The hard cap of `num_steps` iterations was reached.
	StepLimit,
}

/// The generated melody in symbol form.
///
/// An ordered sequence of symbols, hold runs not yet collapsed. The
/// end-of-sequence sentinel is never part of it. Immutable once produced.
#[derive(Debug, Clone)]
pub struct Melody {
	symbols: Vec<Symbol>,
	termination: Termination,
}

impl Melody {
	/// The symbol sequence, seed included.
	pub fn symbols(&self) -> &[Symbol] {
		&self.symbols
	}

	/// How the generation run terminated.
	pub fn termination(&self) -> Termination {
		self.termination
	}

	/// Number of symbols, seed included.
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	/// Whether the melody holds no symbols.
	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}
}

impl fmt::Display for Melody {
	/// Writes the melody back in its surface form, e.g. `"60 _ _ r 62"`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, symbol) in self.symbols.iter().enumerate() {
			if i > 0 {
				write!(f, " ")?;
			}
			write!(f, "{}", symbol)?;
		}
		Ok(())
	}
}

/// One melody generation session.
///
/// # Responsibilities
/// - Own the external model and a read-only, shared vocabulary
/// - Seed and maintain the private context window during a run
/// - Drive the sample/append/decode loop until termination
///
/// # Notes
/// - A session holds no mutable state between runs; multiple independent
///   melodies may be generated concurrently by giving each run its own
///   session, sharing one `Arc<Vocabulary>`.
/// - There is no cancellation primitive: a caller wanting early termination
///   passes a reduced `num_steps` or wraps the call in a cancellable task.
#[derive(Debug)]
pub struct MelodyGenerator<M: SequenceModel> {
	model: M,
	vocabulary: Arc<Vocabulary>,
}

impl<M: SequenceModel> MelodyGenerator<M> {
	/// Creates a session from a model and a shared vocabulary.
	pub fn new(model: M, vocabulary: Arc<Vocabulary>) -> Self {
		Self { model, vocabulary }
	}

	/// The vocabulary this session encodes and decodes with.
	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// Generates a melody from the seed in `input`.
	///
	/// # Behavior
	/// - The context window starts as `max_window` end-of-sequence ids
	///   followed by the encoded seed; the melody starts as the seed symbols
	///   (the seed is never re-emitted by the model, only extended).
	/// - Each step truncates the window to its trailing `max_window` ids,
	///   queries the model, samples one token at the input temperature,
	///   appends it to the window and decodes it. The end-of-sequence
	///   sentinel stops the run without being appended to the melody.
	/// - The loop runs at most `num_steps` iterations.
	///
	/// # Errors
	/// - `InvalidWindow` if `max_window` is zero.
	/// - `UnknownSymbol` if the seed holds a symbol outside the vocabulary.
	/// - `ConfigurationMismatch` if the model output width differs from the
	///   vocabulary size.
	/// - `UnknownToken` if a sampled id resolves to no symbol.
	/// - Sampler errors for unusable probability vectors.
	pub fn generate(&self, input: &GenerationInput) -> Result<Melody, MelodyError> {
		if input.max_window == 0 {
			return Err(MelodyError::InvalidWindow(input.max_window));
		}

		let mut context = SequenceContext::new(input.max_window, self.vocabulary.end_token());
		let mut symbols = Vec::new();
		for surface in input.seed.split_whitespace() {
			let symbol = Symbol::parse(surface)?;
			context.push(self.vocabulary.encode(&symbol)?);
			symbols.push(symbol);
		}

		let mut termination = Termination::StepLimit;
		for _ in 0..input.num_steps {
			let window = context.window();
			let probabilities = self.model.predict(window)?;
			if probabilities.len() != self.vocabulary.len() {
				return Err(MelodyError::ConfigurationMismatch {
					model: probabilities.len(),
					vocabulary: self.vocabulary.len(),
				});
			}

			let token = sampler::sample_with_temperature(&probabilities, input.temperature())?;
			context.push(token);

			let symbol = self.vocabulary.decode(token)?;
			if symbol == Symbol::End {
				termination = Termination::EndOfSequence;
				break;
			}
			symbols.push(symbol);
		}

		Ok(Melody { symbols, termination })
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::VecDeque;

	use super::*;

	/// Plays back a fixed list of one-hot predictions and records the
	/// length and content of every window it is queried with.
	struct ScriptedModel {
		vocabulary_size: usize,
		script: RefCell<VecDeque<TokenId>>,
		windows: RefCell<Vec<Vec<TokenId>>>,
	}

	impl ScriptedModel {
		fn new(vocabulary_size: usize, script: &[TokenId]) -> Self {
			Self {
				vocabulary_size,
				script: RefCell::new(script.iter().copied().collect()),
				windows: RefCell::new(Vec::new()),
			}
		}
	}

	impl SequenceModel for ScriptedModel {
		fn predict(&self, window: &[TokenId]) -> Result<Vec<f32>, MelodyError> {
			self.windows.borrow_mut().push(window.to_vec());
			let token = self.script.borrow_mut().pop_front().expect("script exhausted");
			let mut probabilities = vec![0.0; self.vocabulary_size];
			probabilities[token] = 1.0;
			Ok(probabilities)
		}
	}

	fn vocabulary() -> Arc<Vocabulary> {
		Arc::new(
			Vocabulary::from_json(r#"{ "60": 0, "62": 1, "r": 2, "_": 3, "/": 4 }"#).unwrap(),
		)
	}

	fn input(seed: &str, num_steps: usize, max_window: usize) -> GenerationInput {
		let mut input = GenerationInput::new(seed);
		input.num_steps = num_steps;
		input.max_window = max_window;
		input
	}

	#[test]
	fn zero_steps_returns_the_seed_unchanged() {
		let generator = MelodyGenerator::new(ScriptedModel::new(5, &[]), vocabulary());
		let melody = generator.generate(&input("60 _ _ 62", 0, 8)).unwrap();
		assert_eq!(melody.to_string(), "60 _ _ 62");
		assert_eq!(melody.termination(), Termination::StepLimit);
	}

	#[test]
	fn sentinel_stops_generation_and_is_not_emitted() {
		let generator = MelodyGenerator::new(ScriptedModel::new(5, &[0, 3, 4]), vocabulary());
		let melody = generator.generate(&input("62", 10, 8)).unwrap();
		assert_eq!(melody.to_string(), "62 60 _");
		assert_eq!(melody.termination(), Termination::EndOfSequence);
		assert!(!melody.symbols().contains(&Symbol::End));
	}

	#[test]
	fn step_limit_caps_the_run() {
		let generator = MelodyGenerator::new(ScriptedModel::new(5, &[0, 0, 0]), vocabulary());
		let melody = generator.generate(&input("", 3, 8)).unwrap();
		assert_eq!(melody.to_string(), "60 60 60");
		assert_eq!(melody.termination(), Termination::StepLimit);
	}

	#[test]
	fn every_query_window_has_max_window_length() {
		let model = ScriptedModel::new(5, &[0, 3, 3, 1, 3, 3, 2, 3]);
		let generator = MelodyGenerator::new(model, vocabulary());
		let melody = generator.generate(&input("60 _ _ _ _ _", 8, 4)).unwrap();
		assert_eq!(melody.len(), 14);

		let windows = generator.model.windows.borrow();
		assert_eq!(windows.len(), 8);
		for window in windows.iter() {
			assert_eq!(window.len(), 4);
		}
	}

	#[test]
	fn window_is_padded_with_end_tokens_then_slides() {
		let model = ScriptedModel::new(5, &[1, 3]);
		let generator = MelodyGenerator::new(model, vocabulary());
		generator.generate(&input("60", 2, 3)).unwrap();

		let windows = generator.model.windows.borrow();
		// Sentinel padding, then the seed, then the sampled tokens
		assert_eq!(windows[0], vec![4, 4, 0]);
		assert_eq!(windows[1], vec![4, 0, 1]);
	}

	#[test]
	fn model_width_mismatch_is_fatal() {
		// One probability short of the vocabulary
		let generator = MelodyGenerator::new(ScriptedModel::new(4, &[0]), vocabulary());
		let result = generator.generate(&input("60", 1, 4));
		assert!(matches!(
			result,
			Err(MelodyError::ConfigurationMismatch { model: 4, vocabulary: 5 })
		));
	}

	#[test]
	fn out_of_vocabulary_token_is_fatal() {
		// Sparse table: ids 1, 2 and 3 resolve to no symbol
		let vocabulary =
			Arc::new(Vocabulary::from_json(r#"{ "60": 0, "/": 4 }"#).unwrap());
		let generator = MelodyGenerator::new(ScriptedModel::new(2, &[1]), vocabulary);
		let result = generator.generate(&input("60", 1, 4));
		assert!(matches!(result, Err(MelodyError::UnknownToken { token: 1, .. })));
	}

	#[test]
	fn out_of_vocabulary_seed_is_rejected() {
		let generator = MelodyGenerator::new(ScriptedModel::new(5, &[]), vocabulary());
		let result = generator.generate(&input("60 61", 0, 4));
		assert!(matches!(result, Err(MelodyError::UnknownSymbol(symbol)) if symbol == "61"));
	}

	#[test]
	fn zero_window_is_rejected() {
		let generator = MelodyGenerator::new(ScriptedModel::new(5, &[]), vocabulary());
		let result = generator.generate(&input("60", 1, 0));
		assert!(matches!(result, Err(MelodyError::InvalidWindow(0))));
	}
}
