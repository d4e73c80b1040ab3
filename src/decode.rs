use std::borrow::Cow;

use crate::{Charset, DecodeError, DEFAULT_CHARSET};

#[inline(always)]
fn to_digit(b: u8) -> Option<u8> {
	match b {
		b'0'..=b'9' => Some(b - b'0'),
		b'A'..=b'F' => Some(b - b'A' + 10),
		b'a'..=b'f' => Some(b - b'a' + 10),
		_ => None,
	}
}

/// Byte encoded by the escape sequence starting at `position`.
///
/// `bytes[position]` must be a `%`.
pub(crate) fn escaped_byte(bytes: &[u8], position: usize) -> Result<u8, DecodeError> {
	match bytes.get(position + 1..position + 3) {
		Some(&[hi, lo]) => match (to_digit(hi), to_digit(lo)) {
			(Some(hi), Some(lo)) => Ok(hi << 4 | lo),
			_ => Err(DecodeError::InvalidEscape { position }),
		},
		_ => Err(DecodeError::IncompleteEscape { position }),
	}
}

/// Position of the next `%`, or `+` if `plus` is set, at or after `from`.
fn find_special(bytes: &[u8], from: usize, plus: bool) -> Option<usize> {
	bytes[from..]
		.iter()
		.position(|&b| b == b'%' || (plus && b == b'+'))
		.map(|i| from + i)
}

fn decode_run<'a>(
	charset: Charset,
	run: &'a [u8],
	position: usize,
) -> Result<Cow<'a, str>, DecodeError> {
	charset.decode(run).ok_or(DecodeError::InvalidSequence {
		charset: charset.name(),
		position,
	})
}

/// Percent-decode a `application/x-www-form-urlencoded` string using
/// [`DEFAULT_CHARSET`] (UTF-8).
///
/// This is the strict decoder, see [`decode_with_charset`].
///
/// ```
/// assert_eq!(pct_form::decode("caf%C3%A9+au+lait").unwrap(), "café au lait");
/// assert!(pct_form::decode("100%").is_err());
/// ```
#[inline]
pub fn decode(input: &str) -> Result<Cow<str>, DecodeError> {
	decode_with_charset(input, DEFAULT_CHARSET)
}

/// Percent-decode a `application/x-www-form-urlencoded` string.
///
/// Every `+` is replaced with a space. Consecutive `%XX` escape sequences
/// are gathered into a single byte run and converted back to text using
/// `charset`, so a character spanning several escapes is decoded whole.
/// Any other character is kept as is.
///
/// This is the strict decoder: any malformed escape sequence, such as `%HH`
/// or a trailing `%4`, is an error, and so is a byte run that is not valid in
/// `charset`. See [`lenient_decode`] for a tolerant alternative.
///
/// The input is returned borrowed if it contains neither `%` nor `+`.
pub fn decode_with_charset(input: &str, charset: Charset) -> Result<Cow<str>, DecodeError> {
	let bytes = input.as_bytes();
	let mut start = match find_special(bytes, 0, true) {
		Some(i) => i,
		None => return Ok(Cow::Borrowed(input)),
	};

	let mut decoded = String::with_capacity(input.len());
	decoded.push_str(&input[..start]);

	let mut run = Vec::new();
	while start < bytes.len() {
		match bytes[start] {
			b'+' => {
				decoded.push(' ');
				start += 1;
			}
			b'%' => {
				run.clear();
				let mut i = start;
				while bytes.get(i) == Some(&b'%') {
					run.push(escaped_byte(bytes, i)?);
					i += 3;
				}

				decoded.push_str(&decode_run(charset, &run, start)?);
				start = i;
			}
			_ => {
				let end = find_special(bytes, start, true).unwrap_or(bytes.len());
				decoded.push_str(&input[start..end]);
				start = end;
			}
		}
	}

	Ok(Cow::Owned(decoded))
}

/// Gather the byte run starting with the `%` at `start`.
///
/// Returns the position right after the run.
fn scan_run(bytes: &[u8], start: usize, decode_plus: bool, run: &mut Vec<u8>) -> usize {
	let mut i = start;
	while let Some(&b) = bytes.get(i) {
		if !b.is_ascii() || (decode_plus && b == b'+') {
			break;
		}

		if b == b'%' {
			match escaped_byte(bytes, i) {
				Ok(byte) => {
					run.push(byte);
					i += 3;
					continue;
				}
				Err(e) => log::trace!("keeping `%` literally: {}", e),
			}
		}

		run.push(b);
		i += 1;
	}

	i
}

/// Percent-decode a string, keeping malformed escape sequences as they are.
///
/// Starting at each `%`, a byte run is gathered until the end of the input, a
/// non-ASCII character, or a `+` when `decode_plus` is set. Each valid `%XX`
/// escape sequence in the run yields one byte, and every other ASCII character
/// yields itself. A `%` that does not start a valid escape sequence yields
/// itself too, and the characters after it are scanned as ordinary run
/// members. The run is then converted to text using `charset`.
///
/// Outside of byte runs, characters are copied unchanged, except `+` which
/// becomes a space when `decode_plus` is set.
///
/// Malformed escape sequences are never an error, but a byte run that is not
/// valid in `charset` still is.
///
/// The input is returned borrowed if there is nothing to decode.
///
/// ```
/// use pct_form::{lenient_decode, Charset};
///
/// let utf8 = Charset::utf_8();
/// assert_eq!(lenient_decode("100%+sure", utf8, true).unwrap(), "100% sure");
/// assert_eq!(lenient_decode("%C3%A9%HH", utf8, false).unwrap(), "é%HH");
/// assert!(lenient_decode("%C3", utf8, false).is_err());
/// ```
pub fn lenient_decode(
	input: &str,
	charset: Charset,
	decode_plus: bool,
) -> Result<Cow<str>, DecodeError> {
	let bytes = input.as_bytes();
	let mut start = match find_special(bytes, 0, decode_plus) {
		Some(i) => i,
		None => return Ok(Cow::Borrowed(input)),
	};

	let len = input.len();
	let mut decoded = String::with_capacity(if len > 500 { len / 2 } else { len });
	decoded.push_str(&input[..start]);

	let mut run = Vec::new();
	while start < len {
		match bytes[start] {
			b'+' if decode_plus => {
				decoded.push(' ');
				start += 1;
			}
			b'%' => {
				run.clear();
				let end = scan_run(bytes, start, decode_plus, &mut run);
				decoded.push_str(&decode_run(charset, &run, start)?);
				start = end;
			}
			_ => {
				let end = find_special(bytes, start, decode_plus).unwrap_or(len);
				decoded.push_str(&input[start..end]);
				start = end;
			}
		}
	}

	Ok(Cow::Owned(decoded))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{encode, encode_with_charset};
	use proptest::prelude::*;

	#[test]
	fn plus_and_space() {
		assert_eq!(decode("a+b").unwrap(), "a b");
		assert_eq!(decode("a%20b").unwrap(), "a b");
		assert_eq!(decode("+++").unwrap(), "   ");
	}

	#[test]
	fn multi_byte_runs() {
		assert_eq!(decode("flamb%C3%A9").unwrap(), "flambé");
		assert_eq!(decode("%e7%9c%9f%e6%ad%a3").unwrap(), "真正");
		assert_eq!(decode("%F4%8F%BF%BD").unwrap(), "\u{10FFFD}");
		assert_eq!(
			decode_with_charset("flamb%E9", Charset::iso_8859_1()).unwrap(),
			"flambé"
		);
		assert_eq!(
			decode_with_charset("%80%9F", Charset::iso_8859_1()).unwrap(),
			"\u{80}\u{9f}"
		);
		assert_eq!(
			decode_with_charset("%80", Charset::windows_1252()).unwrap(),
			"€"
		);
	}

	#[test]
	fn hex_case_insensitive() {
		assert_eq!(decode("%c3%a9").unwrap(), decode("%C3%A9").unwrap());
		assert_eq!(decode("%c3%A9").unwrap(), "é");
	}

	#[test]
	fn non_ascii_kept() {
		assert_eq!(decode("é%20ü+ß").unwrap(), "é ü ß");
	}

	#[test]
	fn borrowed_when_untouched() {
		assert!(matches!(decode("plain"), Ok(Cow::Borrowed("plain"))));
		assert!(matches!(decode(""), Ok(Cow::Borrowed(""))));
		assert!(matches!(
			lenient_decode("a+b", Charset::utf_8(), false),
			Ok(Cow::Borrowed("a+b"))
		));
		assert!(matches!(
			lenient_decode("a+b", Charset::utf_8(), true),
			Ok(Cow::Owned(_))
		));
	}

	#[test]
	fn strict_malformed_escapes() {
		assert_eq!(
			decode("%H1").unwrap_err(),
			DecodeError::InvalidEscape { position: 0 }
		);
		assert_eq!(
			decode("a%1G").unwrap_err(),
			DecodeError::InvalidEscape { position: 1 }
		);
		assert_eq!(
			decode("100%").unwrap_err(),
			DecodeError::IncompleteEscape { position: 3 }
		);
		assert_eq!(
			decode("%C3%A").unwrap_err(),
			DecodeError::IncompleteEscape { position: 3 }
		);
		assert_eq!(
			decode("%%32").unwrap_err(),
			DecodeError::InvalidEscape { position: 0 }
		);
		assert_eq!(
			decode("%é1").unwrap_err(),
			DecodeError::InvalidEscape { position: 0 }
		);
	}

	#[test]
	fn strict_invalid_sequence() {
		assert_eq!(
			decode("ok%FF%FE").unwrap_err(),
			DecodeError::InvalidSequence {
				charset: "UTF-8",
				position: 2
			}
		);
		// A character split by a literal is two broken runs.
		assert!(decode("%C3a%A9").is_err());
	}

	#[test]
	fn lenient_keeps_malformed_escapes() {
		let utf8 = Charset::utf_8();
		assert_eq!(lenient_decode("%H1", utf8, false).unwrap(), "%H1");
		assert_eq!(lenient_decode("100%", utf8, false).unwrap(), "100%");
		assert_eq!(lenient_decode("%4", utf8, false).unwrap(), "%4");
		assert_eq!(lenient_decode("%%41", utf8, false).unwrap(), "%A");
		assert_eq!(lenient_decode("%4%41", utf8, false).unwrap(), "%4A");
	}

	#[test]
	fn lenient_plus() {
		let utf8 = Charset::utf_8();
		assert_eq!(lenient_decode("a+b", utf8, false).unwrap(), "a+b");
		assert_eq!(lenient_decode("a+b", utf8, true).unwrap(), "a b");
		assert_eq!(lenient_decode("%41+%42", utf8, false).unwrap(), "A+B");
		assert_eq!(lenient_decode("%41+%42", utf8, true).unwrap(), "A B");
	}

	#[test]
	fn lenient_empty() {
		assert_eq!(lenient_decode("", Charset::utf_8(), true).unwrap(), "");
		assert_eq!(lenient_decode("", Charset::utf_8(), false).unwrap(), "");
	}

	#[test]
	fn lenient_multi_byte_runs() {
		let utf8 = Charset::utf_8();
		assert_eq!(lenient_decode("%C3%A9", utf8, true).unwrap(), "é");
		assert_eq!(lenient_decode("a%C3%A9+b", utf8, true).unwrap(), "aé b");
		assert_eq!(lenient_decode("%41é%42", utf8, false).unwrap(), "AéB");
		assert_eq!(
			lenient_decode("%E9t%E9", Charset::windows_1252(), false).unwrap(),
			"été"
		);
	}

	#[test]
	fn lenient_invalid_sequence_is_fatal() {
		let utf8 = Charset::utf_8();
		assert_eq!(
			lenient_decode("x+%E9t%E9", utf8, true).unwrap_err(),
			DecodeError::InvalidSequence {
				charset: "UTF-8",
				position: 2
			}
		);
		// The run ends at `é`, leaving a truncated sequence.
		assert!(lenient_decode("%C3é", utf8, false).is_err());
	}

	#[test]
	fn lenient_presizes_long_inputs() {
		let input = "%41".repeat(300);
		let decoded = lenient_decode(&input, Charset::utf_8(), true).unwrap();
		assert_eq!(decoded, "A".repeat(300));
	}

	#[test]
	fn flambe_round_trip() {
		let latin1 = Charset::for_label("iso-8859-1").unwrap();
		let encoded = encode_with_charset("flambé", latin1);
		assert_eq!(encoded, "flamb%E9");
		assert_eq!(decode_with_charset(&encoded, latin1).unwrap(), "flambé");
	}

	#[test]
	fn latin1_c1_controls_round_trip() {
		let latin1 = Charset::for_label("latin1").unwrap();
		let encoded = encode_with_charset("\u{80}x\u{9f}", latin1);
		assert_eq!(encoded, "%80x%9F");
		assert_eq!(decode_with_charset(&encoded, latin1).unwrap(), "\u{80}x\u{9f}");
		assert_eq!(
			lenient_decode(&encoded, latin1, false).unwrap(),
			"\u{80}x\u{9f}"
		);
	}

	proptest! {
		#[test]
		fn utf_8_round_trip(s in "\\PC*") {
			let encoded = encode(&s);
			prop_assert_eq!(decode(&encoded).unwrap(), s.as_str());
			prop_assert_eq!(lenient_decode(&encoded, Charset::utf_8(), true).unwrap(), s.as_str());
		}

		#[test]
		fn utf_8_round_trip_any_string(s in any::<String>()) {
			let encoded = encode(&s);
			prop_assert!(encoded.is_ascii());
			prop_assert_eq!(decode(&encoded).unwrap(), s.as_str());
			prop_assert_eq!(lenient_decode(&encoded, Charset::utf_8(), true).unwrap(), s.as_str());
		}

		#[test]
		fn latin1_round_trip(s in "[ -~\u{80}-\u{ff}]*") {
			let latin1 = Charset::iso_8859_1();
			let encoded = encode_with_charset(&s, latin1);
			prop_assert_eq!(decode_with_charset(&encoded, latin1).unwrap(), s.as_str());
		}

		#[test]
		fn lenient_never_rejects_ascii(s in "[ -~]*") {
			prop_assert!(lenient_decode(&s, Charset::iso_8859_1(), true).is_ok());
		}
	}
}
