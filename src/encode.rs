use std::borrow::Cow;

use crate::{Charset, DEFAULT_CHARSET};

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encoding predicate.
///
/// Instances of this trait are used along with [`encode_with`] to decide which
/// characters must be percent-encoded.
///
/// Whatever the predicate says, `%`, `+` and every non-ASCII character are
/// always encoded, so the output is always US-ASCII and decodes back to the
/// input. A space left untouched by the predicate is kept as is.
///
/// # Example
///
/// ```
/// use pct_form::{encode_with, Charset, Encoder, FormUnreserved};
///
/// struct NoCapitals;
///
/// impl Encoder for NoCapitals {
/// 	fn encode(&self, c: char) -> bool {
/// 		FormUnreserved.encode(c) || c.is_ascii_uppercase()
/// 	}
///
/// 	fn space_as_plus(&self) -> bool {
/// 		true
/// 	}
/// }
///
/// let encoded = encode_with("Hello World!", Charset::utf_8(), &NoCapitals);
/// assert_eq!(encoded, "%48ello+%57orld%21");
/// ```
pub trait Encoder {
	/// Decide if the given character must be encoded.
	fn encode(&self, c: char) -> bool;

	/// Write spaces as `+` instead of `%20`.
	fn space_as_plus(&self) -> bool {
		false
	}
}

/// `application/x-www-form-urlencoded` encoder.
///
/// Leaves ASCII alphanumerics and `-`, `_`, `.`, `*` untouched, writes spaces
/// as `+`, and encodes everything else. This is the
/// [byte serializer](https://url.spec.whatwg.org/#concept-urlencoded-byte-serializer)
/// used by HTML form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormUnreserved;

impl Encoder for FormUnreserved {
	fn encode(&self, c: char) -> bool {
		!matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '*')
	}

	fn space_as_plus(&self) -> bool {
		true
	}
}

/// URI-unreserved characters encoder.
///
/// Leaves the `unreserved` characters of
/// [RFC 3986](https://tools.ietf.org/html/rfc3986#section-2.3) untouched and
/// encodes everything else, spaces included. Use it for path segments, where
/// `+` does not mean space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriUnreserved;

impl Encoder for UriUnreserved {
	fn encode(&self, c: char) -> bool {
		!matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '.' | '_' | '~')
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
	Literal,
	Plus,
	Escaped,
}

fn classify<E: Encoder + ?Sized>(encoder: &E, c: char) -> Class {
	if c == ' ' && encoder.space_as_plus() {
		Class::Plus
	} else if !c.is_ascii() || c == '%' || c == '+' || encoder.encode(c) {
		Class::Escaped
	} else {
		Class::Literal
	}
}

#[inline]
fn push_escaped(encoded: &mut String, byte: u8) {
	encoded.push('%');
	encoded.push(UPPER_HEX[(byte >> 4) as usize] as char);
	encoded.push(UPPER_HEX[(byte & 0x0f) as usize] as char);
}

/// Percent-encode a string for `application/x-www-form-urlencoded` using
/// [`DEFAULT_CHARSET`] (UTF-8).
///
/// Spaces are replaced with `+`, so this should not be used for paths or
/// hosts. See [`UriUnreserved`] for those.
///
/// ```
/// assert_eq!(pct_form::encode("flambé au rhum"), "flamb%C3%A9+au+rhum");
/// ```
#[inline]
pub fn encode(input: &str) -> Cow<str> {
	encode_with(input, DEFAULT_CHARSET, &FormUnreserved)
}

/// Percent-encode a string for `application/x-www-form-urlencoded` using the
/// given charset.
///
/// ```
/// use pct_form::{encode_with_charset, Charset};
///
/// let latin1 = Charset::for_label("iso-8859-1").unwrap();
/// assert_eq!(encode_with_charset("flambé", latin1), "flamb%E9");
/// ```
#[inline]
pub fn encode_with_charset(input: &str, charset: Charset) -> Cow<str> {
	encode_with(input, charset, &FormUnreserved)
}

/// Percent-encode a string.
///
/// The `encoder` decides which characters are encoded. Consecutive encoded
/// characters are converted to bytes by `charset` in one go, and each byte is
/// written as `%` followed by two uppercase hexadecimal digits.
///
/// The input is returned borrowed if nothing needs encoding.
pub fn encode_with<'a, E: Encoder + ?Sized>(
	input: &'a str,
	charset: Charset,
	encoder: &E,
) -> Cow<'a, str> {
	if input.chars().all(|c| classify(encoder, c) == Class::Literal) {
		return Cow::Borrowed(input);
	}

	let mut encoded = String::with_capacity(input.len() + input.len() / 2);
	let mut start = 0;
	while let Some(c) = input[start..].chars().next() {
		let class = classify(encoder, c);
		let rest = &input[start..];
		let len = rest
			.char_indices()
			.find(|&(_, c)| classify(encoder, c) != class)
			.map_or(rest.len(), |(i, _)| i);
		let run = &rest[..len];

		match class {
			Class::Literal => encoded.push_str(run),
			// A run of spaces, one byte each.
			Class::Plus => encoded.extend(std::iter::repeat('+').take(len)),
			Class::Escaped => {
				for &byte in charset.encode(run).iter() {
					push_escaped(&mut encoded, byte)
				}
			}
		}

		start += len;
	}

	Cow::Owned(encoded)
}
