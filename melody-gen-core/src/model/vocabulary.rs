use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::MelodyError;
use crate::io;

/// Integer identifier the sequence model operates on internally.
pub type TokenId = usize;

/// Surface form of the end-of-sequence sentinel in the symbol table.
pub const END_SYMBOL: &str = "/";

/// One unit of the symbolic melody encoding.
///
/// `Pitch` and `Rest` are event-starting symbols; `Hold` is a continuation
/// symbol extending the duration of the previous event-starting symbol by
/// one base step; `End` is a sentinel terminating generation and is never
/// emitted into a melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
	/// A MIDI pitch number (0-127).
	Pitch(u8),
	/// A rest, surface form `"r"`.
	Rest,
	/// A hold/continue marker, surface form `"_"`.
	Hold,
	/// The end-of-sequence sentinel, surface form `"/"`.
	End,
}

impl Symbol {
	/// Parses a surface form into a `Symbol`.
	///
	/// Accepted forms are `"r"`, `"_"`, `"/"` and decimal pitch numbers
	/// in 0-127.
	///
	/// # Errors
	/// Returns `UnknownSymbol` for anything else, including out-of-range
	/// pitch numbers.
	pub fn parse(surface: &str) -> Result<Self, MelodyError> {
		match surface {
			"r" => Ok(Symbol::Rest),
			"_" => Ok(Symbol::Hold),
			END_SYMBOL => Ok(Symbol::End),
			_ => match surface.parse::<u8>() {
				Ok(pitch) if pitch <= 127 => Ok(Symbol::Pitch(pitch)),
				_ => Err(MelodyError::UnknownSymbol(surface.to_owned())),
			},
		}
	}

	/// Whether this symbol starts a new timed event (pitch or rest).
	pub fn starts_event(&self) -> bool {
		matches!(self, Symbol::Pitch(_) | Symbol::Rest)
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Symbol::Pitch(pitch) => write!(f, "{}", pitch),
			Symbol::Rest => write!(f, "r"),
			Symbol::Hold => write!(f, "_"),
			Symbol::End => write!(f, "{}", END_SYMBOL),
		}
	}
}

/// Fixed, bidirectional mapping between symbols and token ids.
///
/// The vocabulary covers exactly the symbols seen during training plus the
/// end-of-sequence sentinel. It is loaded once from a persisted symbol
/// table and immutable thereafter.
///
/// # Invariants
/// - `symbol <-> token_id` is a bijection
/// - The end-of-sequence sentinel is always present
/// - The reverse lookup is a map built once at load time, never a scan
#[derive(Debug, Clone)]
pub struct Vocabulary {
	/// Symbol to token id.
	forward: HashMap<Symbol, TokenId>,
	/// Token id back to symbol, built once at load time.
	inverse: HashMap<TokenId, Symbol>,
	/// Token id of the end-of-sequence sentinel.
	end_token: TokenId,
}

impl Vocabulary {
	/// Loads a vocabulary from a JSON symbol table on disk.
	///
	/// The file holds a single JSON object mapping surface forms to token
	/// ids, e.g. `{ "60": 0, "r": 1, "_": 2, "/": 3 }`.
	///
	/// # Errors
	/// - `Io` if the file cannot be read.
	/// - `SymbolTable` if the content is malformed (see `from_mappings`).
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MelodyError> {
		let contents = io::read_file(path)?;
		Self::from_json(&contents)
	}

	/// Parses a vocabulary from a JSON symbol table string.
	pub fn from_json(json: &str) -> Result<Self, MelodyError> {
		let mappings: HashMap<String, TokenId> = serde_json::from_str(json)
			.map_err(|e| MelodyError::SymbolTable(e.to_string()))?;
		Self::from_mappings(mappings)
	}

	/// Builds a vocabulary from surface-form/token-id pairs.
	///
	/// # Errors
	/// Returns `SymbolTable` if:
	/// - a surface form is not a legal symbol,
	/// - two symbols share the same token id (or two surface forms denote
	///   the same symbol),
	/// - the end-of-sequence sentinel is absent.
	pub fn from_mappings(mappings: HashMap<String, TokenId>) -> Result<Self, MelodyError> {
		let mut forward = HashMap::with_capacity(mappings.len());
		let mut inverse = HashMap::with_capacity(mappings.len());

		for (surface, token) in mappings {
			let symbol = Symbol::parse(&surface)
				.map_err(|_| MelodyError::SymbolTable(format!("unparseable symbol '{}'", surface)))?;
			if inverse.insert(token, symbol).is_some() {
				return Err(MelodyError::SymbolTable(format!("token id {} mapped twice", token)));
			}
			if forward.insert(symbol, token).is_some() {
				return Err(MelodyError::SymbolTable(format!("symbol '{}' mapped twice", symbol)));
			}
		}

		let end_token = match forward.get(&Symbol::End) {
			Some(token) => *token,
			None => {
				return Err(MelodyError::SymbolTable(format!(
					"missing end-of-sequence symbol '{}'",
					END_SYMBOL
				)));
			}
		};

		Ok(Self { forward, inverse, end_token })
	}

	/// Maps a symbol to its token id.
	///
	/// # Errors
	/// Returns `UnknownSymbol` if the symbol is absent. Seeds drawn from the
	/// known vocabulary never fail here; user-supplied seeds containing
	/// out-of-vocabulary symbols fail explicitly instead of silently
	/// corrupting the window.
	pub fn encode(&self, symbol: &Symbol) -> Result<TokenId, MelodyError> {
		self.forward
			.get(symbol)
			.copied()
			.ok_or_else(|| MelodyError::UnknownSymbol(symbol.to_string()))
	}

	/// Maps a token id back to its symbol.
	///
	/// # Errors
	/// Returns `UnknownToken` if the id is outside the vocabulary. This
	/// indicates a fatal mismatch between the model output width and the
	/// vocabulary and aborts generation; it is never retried.
	pub fn decode(&self, token: TokenId) -> Result<Symbol, MelodyError> {
		self.inverse.get(&token).copied().ok_or(MelodyError::UnknownToken {
			token,
			vocabulary: self.inverse.len(),
		})
	}

	/// Token id of the end-of-sequence sentinel.
	pub fn end_token(&self) -> TokenId {
		self.end_token
	}

	/// Number of symbols in the vocabulary, sentinel included.
	pub fn len(&self) -> usize {
		self.forward.len()
	}

	/// Whether the vocabulary holds no symbols.
	pub fn is_empty(&self) -> bool {
		self.forward.is_empty()
	}
}
