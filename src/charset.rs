use std::borrow::Cow;
use std::{fmt, hash};

use encoding_rs::{mem, Encoding};

use crate::UnsupportedEncoding;

/// Default charset, UTF-8, per Section 2.5 of
/// [RFC 3986](https://tools.ietf.org/html/rfc3986).
pub static DEFAULT_CHARSET: Charset = Charset(Inner::Encoding(&encoding_rs::UTF_8_INIT));

/// Labels of ISO-8859-1, from the IANA character sets registry.
const ISO_8859_1_LABELS: &[&str] = &[
	"iso-8859-1",
	"iso8859-1",
	"iso88591",
	"iso_8859-1",
	"iso_8859-1:1987",
	"iso-ir-100",
	"latin1",
	"l1",
	"ibm819",
	"cp819",
	"csisolatin1",
];

/// Byte encoding used to turn characters into escaped bytes and back.
///
/// Only encodings able to encode to themselves are accepted, so that every
/// string written with a charset can be read back with the same charset.
/// This excludes UTF-16 and the `replacement` encoding.
///
/// ISO-8859-1 maps each byte to the code point of the same value. It is not
/// aliased to windows-1252 as the Encoding Standard does.
///
/// # Example
///
/// ```
/// use pct_form::Charset;
///
/// let latin1 = Charset::for_label("ISO-8859-1").unwrap();
/// assert_eq!(latin1.name(), "ISO-8859-1");
/// assert_eq!(Charset::for_label("cp1252").unwrap().name(), "windows-1252");
/// assert!(Charset::for_label("utf-16le").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(Inner);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inner {
	Latin1,
	Encoding(&'static Encoding),
}

impl Charset {
	/// Wrap an `encoding_rs` encoding.
	///
	/// Returns `None` if the encoding cannot be used to encode text.
	pub fn new(encoding: &'static Encoding) -> Option<Charset> {
		if encoding.output_encoding() == encoding {
			Some(Charset(Inner::Encoding(encoding)))
		} else {
			None
		}
	}

	/// Resolve a charset from one of its labels.
	///
	/// ISO-8859-1 labels (`iso-8859-1`, `latin1`, `l1`, ...) give
	/// [`Charset::iso_8859_1`]. Any other label is looked up in the
	/// [Encoding Standard](https://encoding.spec.whatwg.org/#names-and-labels).
	///
	/// Labels are matched case-insensitively, ignoring surrounding whitespace.
	pub fn for_label(label: &str) -> Result<Charset, UnsupportedEncoding> {
		let trimmed = label.trim_matches(|c: char| c.is_ascii_whitespace());
		if ISO_8859_1_LABELS
			.iter()
			.any(|l| l.eq_ignore_ascii_case(trimmed))
		{
			return Ok(Charset::iso_8859_1());
		}

		Encoding::for_label_no_replacement(label.as_bytes())
			.and_then(Charset::new)
			.ok_or_else(|| {
				log::debug!("rejecting charset label {:?}", label);
				UnsupportedEncoding {
					label: label.to_string(),
				}
			})
	}

	#[inline]
	pub fn utf_8() -> Charset {
		DEFAULT_CHARSET
	}

	/// ISO-8859-1: bytes `0x00` to `0xFF` are code points `U+0000` to `U+00FF`.
	#[inline]
	pub fn iso_8859_1() -> Charset {
		Charset(Inner::Latin1)
	}

	#[inline]
	pub fn windows_1252() -> Charset {
		Charset(Inner::Encoding(encoding_rs::WINDOWS_1252))
	}

	/// Canonical name of the charset.
	#[inline]
	pub fn name(&self) -> &'static str {
		match self.0 {
			Inner::Latin1 => "ISO-8859-1",
			Inner::Encoding(encoding) => encoding.name(),
		}
	}

	/// Underlying `encoding_rs` encoding, if any.
	///
	/// ISO-8859-1 has none.
	#[inline]
	pub fn encoding(&self) -> Option<&'static Encoding> {
		match self.0 {
			Inner::Latin1 => None,
			Inner::Encoding(encoding) => Some(encoding),
		}
	}

	/// Convert text into bytes.
	///
	/// Characters the charset cannot represent are written as HTML decimal
	/// numeric character references (`&#233;`), as browsers do for forms.
	pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
		match self.0 {
			Inner::Latin1 => encode_latin1(text),
			Inner::Encoding(encoding) => {
				let (bytes, _, unmappable) = encoding.encode(text);
				if unmappable {
					log::debug!("unmappable characters replaced in {} output", self.name());
				}

				bytes
			}
		}
	}

	/// Convert bytes into text.
	///
	/// No BOM sniffing is done and malformed sequences are not replaced:
	/// `None` is returned instead.
	pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
		match self.0 {
			Inner::Latin1 => Some(mem::decode_latin1(bytes)),
			Inner::Encoding(encoding) => {
				encoding.decode_without_bom_handling_and_without_replacement(bytes)
			}
		}
	}
}

fn encode_latin1(text: &str) -> Cow<[u8]> {
	if mem::is_str_latin1(text) {
		return mem::encode_latin1_lossy(text);
	}

	log::debug!("unmappable characters replaced in ISO-8859-1 output");
	let mut bytes = Vec::with_capacity(text.len());
	for c in text.chars() {
		match u8::try_from(u32::from(c)) {
			Ok(b) => bytes.push(b),
			Err(_) => bytes.extend_from_slice(format!("&#{};", u32::from(c)).as_bytes()),
		}
	}

	Cow::Owned(bytes)
}

impl Default for Charset {
	#[inline]
	fn default() -> Self {
		DEFAULT_CHARSET
	}
}

impl hash::Hash for Charset {
	#[inline]
	fn hash<H: hash::Hasher>(&self, hasher: &mut H) {
		self.name().hash(hasher)
	}
}

impl fmt::Display for Charset {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_utf_8() {
		assert_eq!(Charset::default().name(), "UTF-8");
		assert_eq!(Charset::default(), Charset::utf_8());
		assert_eq!(Charset::for_label(" utf8 ").unwrap(), DEFAULT_CHARSET);
	}

	#[test]
	fn latin1_labels() {
		for label in ["iso-8859-1", "ISO-8859-1", "latin1", "l1", " ISO_8859-1 "] {
			assert_eq!(Charset::for_label(label).unwrap(), Charset::iso_8859_1());
		}

		for label in ["windows-1252", "cp1252"] {
			assert_eq!(Charset::for_label(label).unwrap(), Charset::windows_1252());
		}
	}

	#[test]
	fn unsupported_labels() {
		let err = Charset::for_label("no-such-charset").unwrap_err();
		assert_eq!(err.label, "no-such-charset");

		// `replacement` and UTF-16 cannot encode to themselves.
		assert!(Charset::for_label("iso-2022-kr").is_err());
		assert!(Charset::for_label("utf-16be").is_err());
		assert!(Charset::new(encoding_rs::UTF_16LE).is_none());
		assert!(Charset::new(encoding_rs::SHIFT_JIS).is_some());
	}

	#[test]
	fn encode_and_decode_bytes() {
		let cp1252 = Charset::windows_1252();
		assert_eq!(&*cp1252.encode("é"), &[0xe9]);
		assert_eq!(cp1252.decode(&[0xe9]).unwrap(), "é");
		assert_eq!(&*cp1252.encode("日"), b"&#26085;");

		assert_eq!(&*Charset::utf_8().encode("é"), &[0xc3, 0xa9]);
		assert!(Charset::utf_8().decode(&[0xc3]).is_none());
	}

	#[test]
	fn latin1_is_not_windows_1252() {
		let latin1 = Charset::iso_8859_1();
		assert_eq!(latin1.decode(&[0x80, 0x9f, 0xe9]).unwrap(), "\u{80}\u{9f}é");
		assert_eq!(&*latin1.encode("\u{80}\u{9f}é"), &[0x80, 0x9f, 0xe9]);
		assert_eq!(&*latin1.encode("a€"), b"a&#8364;");
		assert_eq!(Charset::windows_1252().decode(&[0x80]).unwrap(), "€");
		assert!(latin1.encoding().is_none());
	}

	#[test]
	fn display() {
		assert_eq!(Charset::for_label("sjis").unwrap().to_string(), "Shift_JIS");
		assert_eq!(Charset::iso_8859_1().to_string(), "ISO-8859-1");
	}
}
