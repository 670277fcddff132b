use std::collections::VecDeque;

use super::vocabulary::TokenId;

/// Bounded sliding window of the most recent token history fed to the model.
///
/// The window is seeded with `max_window` repetitions of the end-of-sequence
/// token so the model always receives a full-length input even at the very
/// first step. Appends grow the buffer; truncation to the trailing
/// `max_window` ids happens at query time.
///
/// ## Invariants
/// - `window()` always returns exactly `max_window` ids
/// - Tokens are only ever dropped from the front, never reordered
#[derive(Debug)]
pub(crate) struct SequenceContext {
	max_window: usize,
	tokens: VecDeque<TokenId>,
}

impl SequenceContext {
	/// Creates a context seeded with `max_window` copies of `end_token`.
	pub(crate) fn new(max_window: usize, end_token: TokenId) -> Self {
		let mut tokens = VecDeque::with_capacity(max_window * 2);
		tokens.extend(std::iter::repeat(end_token).take(max_window));
		Self { max_window, tokens }
	}

	/// Appends a token to the history.
	pub(crate) fn push(&mut self, token: TokenId) {
		self.tokens.push_back(token);
	}

	/// Truncates the history to its trailing `max_window` ids and returns
	/// them as a contiguous slice.
	pub(crate) fn window(&mut self) -> &[TokenId] {
		while self.tokens.len() > self.max_window {
			self.tokens.pop_front();
		}
		self.tokens.make_contiguous()
	}
}
