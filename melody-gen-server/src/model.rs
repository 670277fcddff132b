use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use melody_gen_core::error::MelodyError;
use melody_gen_core::model::generator::SequenceModel;
use melody_gen_core::model::vocabulary::TokenId;

/// Stand-in sequence model served from a postcard-encoded `.dat` file.
///
/// Holds one probability row per token id; `predict` returns the row of the
/// trailing window token. This keeps the server runnable end to end while
/// real trained models stay external behind the `SequenceModel` contract.
///
/// # Invariants
/// - `rows.len()` equals the vocabulary size of the pairing it was built for
/// - Each row is a normalized distribution over the full vocabulary
#[derive(Serialize, Deserialize, Debug)]
pub struct TransitionModel {
	rows: Vec<Vec<f32>>,
}

impl TransitionModel {
	/// Loads a model from a postcard-encoded file.
	///
	/// # Errors
	/// Returns an error if file I/O or deserialization fails, or if the
	/// file holds no transition rows.
	pub fn new<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let bytes = fs::read(filepath)?;
		let model: TransitionModel = postcard::from_bytes(&bytes)?;
		if model.rows.is_empty() {
			return Err("Model holds no transition rows".into());
		}
		Ok(model)
	}

	/// Width of the distributions this model produces.
	pub fn vocabulary_size(&self) -> usize {
		self.rows.len()
	}
}

impl SequenceModel for TransitionModel {
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
