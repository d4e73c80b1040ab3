use thiserror::Error;

/// Decoding error.
///
/// Raised when a percent-encoded input cannot be decoded.
/// Every variant carries the byte offset in the input where the problem starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// A `%` is followed by fewer than two characters.
	#[error("incomplete percent-encoding segment at offset {position}")]
	IncompleteEscape { position: usize },

	/// A `%` is followed by something that is not a hexadecimal digit.
	#[error("invalid percent-encoding segment at offset {position}")]
	InvalidEscape { position: usize },

	/// A run of decoded bytes is not valid text in the charset.
	///
	/// `position` is the offset of the first input character of the run.
	#[error("invalid {charset} byte sequence at offset {position}")]
	InvalidSequence {
		charset: &'static str,
		position: usize,
	},
}

impl DecodeError {
	/// Offset in the input, in bytes, where the error starts.
	pub fn position(&self) -> usize {
		match self {
			Self::IncompleteEscape { position }
			| Self::InvalidEscape { position }
			| Self::InvalidSequence { position, .. } => *position,
		}
	}
}

/// Unknown or unusable charset label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported encoding `{label}`")]
pub struct UnsupportedEncoding {
	pub label: String,
}
