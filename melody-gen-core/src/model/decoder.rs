use serde::{Deserialize, Serialize};

use crate::error::MelodyError;
use crate::model::vocabulary::Symbol;

/// One timed event of the decoded melody.
///
/// Durations are expressed in the caller's base step unit (for the usual
/// sixteenth-note step, `0.25` quarter lengths) and are exact multiples of
/// it; no snapping to musical note values is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteEvent {
	/// A sounded note.
	Note { pitch: u8, duration: f64 },
	/// A silence.
	Rest { duration: f64 },
}

impl NoteEvent {
	fn new(symbol: Symbol, duration: f64) -> Self {
		match symbol {
			Symbol::Pitch(pitch) => NoteEvent::Note { pitch, duration },
			_ => NoteEvent::Rest { duration },
		}
	}

	/// Duration of the event, in base step units times the base step.
	pub fn duration(&self) -> f64 {
		match self {
			NoteEvent::Note { duration, .. } | NoteEvent::Rest { duration } => *duration,
		}
	}
}

/// Collapses a flat symbol sequence into timed note/rest events.
///
/// Single left-to-right pass: each event-starting symbol opens a pending
/// event, each hold marker extends it by one base step, and the next
/// event-starting symbol flushes it. The final pending event is flushed at
/// the end of the scan. A leading hold with no preceding event-starting
/// symbol cannot start a run and is ignored; an end-of-sequence sentinel
/// terminates the scan.
///
/// For a melody without leading holds, the durations sum to exactly
/// `base_step * melody length`.
///
/// # Errors
/// - `InvalidStepDuration` if `base_step` is not strictly positive.
/// - `EmptyMelody` if the scan produces no complete event.
pub fn decode(melody: &[Symbol], base_step: f64) -> Result<Vec<NoteEvent>, MelodyError> {
	if !(base_step > 0.0) {
		return Err(MelodyError::InvalidStepDuration(base_step));
	}

	let mut events = Vec::new();
	let mut pending: Option<Symbol> = None;
	let mut run = 1usize;

	for &symbol in melody {
		match symbol {
			Symbol::Hold => {
				if pending.is_some() {
					run += 1;
				}
			}
			Symbol::End => break,
			_ => {
				if let Some(previous) = pending.replace(symbol) {
					events.push(NoteEvent::new(previous, base_step * run as f64));
				}
				run = 1;
			}
		}
	}

	match pending {
		Some(last) => events.push(NoteEvent::new(last, base_step * run as f64)),
		None => return Err(MelodyError::EmptyMelody),
	}

	Ok(events)
}
