use std::collections::HashMap;
use std::sync::Arc;

use melody_gen_core::error::MelodyError;
use melody_gen_core::model::decoder::decode;
use melody_gen_core::model::generation_input::GenerationInput;
use melody_gen_core::model::generator::{MelodyGenerator, SequenceModel};
use melody_gen_core::model::vocabulary::{TokenId, Vocabulary};

/// Minimal in-memory model: one fixed distribution per trailing token.
/// A trained sequence model plugs in through the same contract.
struct DemoModel {
	rows: Vec<Vec<f32>>,
}

impl SequenceModel for DemoModel {
	fn predict(&self, window: &[TokenId]) -> Result<Vec<f32>, MelodyError> {
		let last = match window.last() {
			Some(token) => *token,
			None => return Err(MelodyError::InvalidWindow(0)),
		};
		self.rows.get(last).cloned().ok_or(MelodyError::UnknownToken {
			token: last,
			vocabulary: self.rows.len(),
		})
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Build the symbol table in memory; a session would normally load it
	// from a persisted mapping file with Vocabulary::from_file
	let mappings: HashMap<String, TokenId> = [
		("60", 0), ("62", 1), ("64", 2), ("r", 3), ("_", 4), ("/", 5),
	]
	.into_iter()
	.map(|(surface, token)| (surface.to_owned(), token))
	.collect();
	let vocabulary = Arc::new(Vocabulary::from_mappings(mappings)?);

	// Hand-written transition rows, one per token id, each summing to 1.0
	let model = DemoModel {
		rows: vec![
			vec![0.05, 0.10, 0.10, 0.05, 0.65, 0.05], // after 60
			vec![0.10, 0.05, 0.10, 0.05, 0.65, 0.05], // after 62
			vec![0.10, 0.10, 0.05, 0.05, 0.60, 0.10], // after 64
			vec![0.20, 0.20, 0.20, 0.00, 0.35, 0.05], // after r
			vec![0.20, 0.15, 0.15, 0.10, 0.35, 0.05], // after _
			vec![0.40, 0.30, 0.20, 0.10, 0.00, 0.00], // after /
		],
	};

	// One session per concurrent run; the vocabulary is shared read-only
	let generator = MelodyGenerator::new(model, vocabulary);

	let mut input = GenerationInput::new("60 _ _ _ 62 _");

	// Hard cap on generated symbols; the model can stop earlier by
	// sampling the end-of-sequence sentinel
	input.num_steps = 64;

	// Trailing token history fed to the model at every step
	input.max_window = 16;

	// Below 1.0 sampling sharpens toward the likeliest token, above 1.0
	// it flattens toward uniform; 1.0 keeps the model's own distribution
	input.set_temperature(0.7)?;

	// Temperatures outside (0, inf) are rejected
	match input.set_temperature(0.0) {
		Ok(_) => println!("Should not happen"),
		Err(_) => println!("Temperature 0.0 is invalid, must be strictly positive"),
	}

	for i in 0..5 {
		let melody = generator.generate(&input)?;
		println!("Melody {} ({:?}): {}", i + 1, melody.termination(), melody);

		// Collapse hold markers into timed events, one base step (0.25
		// quarter lengths) per symbol position
		for event in decode(melody.symbols(), 0.25)? {
			println!("  {:?}", event);
		}
	}

	Ok(())
}
