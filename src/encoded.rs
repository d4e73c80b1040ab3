use std::borrow::Borrow;
use std::cmp::Ordering;
use std::{fmt, hash, str::FromStr};

use crate::decode::escaped_byte;
use crate::{encode, DecodeError, DEFAULT_CHARSET};

/// Bytes iterator.
///
/// Iterates over the decoded bytes of a form-encoded string.
pub struct Bytes<'a> {
	data: &'a [u8],
	position: usize,
}

impl<'a> Iterator for Bytes<'a> {
	type Item = u8;

	fn next(&mut self) -> Option<u8> {
		let b = *self.data.get(self.position)?;
		match b {
			b'+' => {
				self.position += 1;
				Some(b' ')
			}
			b'%' => match escaped_byte(self.data, self.position) {
				Ok(byte) => {
					self.position += 3;
					Some(byte)
				}
				Err(_) => {
					self.position += 1;
					Some(b)
				}
			},
			_ => {
				self.position += 1;
				Some(b)
			}
		}
	}
}

impl<'a> std::iter::FusedIterator for Bytes<'a> {}

/// Bytes of a run of escape sequences already known to be well formed.
struct EscapeRun<'a> {
	data: &'a [u8],
	position: usize,
	end: usize,
}

impl<'a> Iterator for EscapeRun<'a> {
	type Item = u8;

	fn next(&mut self) -> Option<u8> {
		if self.position >= self.end {
			return None;
		}

		let byte = escaped_byte(self.data, self.position).ok()?;
		self.position += 3;
		Some(byte)
	}
}

/// Check that `data` would be accepted by the strict UTF-8 decoder, without
/// building the decoded string.
fn check(data: &str) -> Result<(), DecodeError> {
	let bytes = data.as_bytes();
	let mut i = 0;
	while let Some(&b) = bytes.get(i) {
		if b != b'%' {
			i += 1;
			continue;
		}

		let start = i;
		while bytes.get(i) == Some(&b'%') {
			escaped_byte(bytes, i)?;
			i += 3;
		}

		let invalid = DecodeError::InvalidSequence {
			charset: DEFAULT_CHARSET.name(),
			position: start,
		};

		let run = || EscapeRun {
			data: bytes,
			position: start,
			end: i,
		};

		// Each character must re-encode to exactly the bytes it came from,
		// which rules out overlong and truncated sequences.
		let mut expected = run();
		let mut buf = [0; 4];
		for c in utf8_decode::Decoder::new(run()) {
			let c = c.map_err(|_| invalid.clone())?;
			for &b in c.encode_utf8(&mut buf).as_bytes() {
				if expected.next() != Some(b) {
					return Err(invalid);
				}
			}
		}

		if expected.next().is_some() {
			return Err(invalid);
		}
	}

	Ok(())
}

/// Characters iterator.
///
/// Iterates over the decoded characters of a form-encoded string.
pub struct Chars<'a> {
	inner: utf8_decode::Decoder<Bytes<'a>>,
}

impl<'a> Iterator for Chars<'a> {
	type Item = char;

	fn next(&mut self) -> Option<char> {
		// `EncodedStr` guarantees a valid UTF-8 byte sequence.
		self.inner
			.next()
			.map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
	}
}

impl<'a> std::iter::FusedIterator for Chars<'a> {}

/// Form-encoded string slice.
///
/// A `str` known to be valid `application/x-www-form-urlencoded` text under
/// UTF-8: every `%` starts a valid escape sequence and the escaped bytes form
/// valid UTF-8. `+` stands for a space.
///
/// This is an *unsized* type, meaning that it must always be used behind a
/// pointer like `&` or [`Box`]. For an owned version of this type,
/// see [`EncodedString`].
///
/// # Examples
///
/// ```
/// use pct_form::EncodedStr;
///
/// let encoded = EncodedStr::new("caf%C3%A9+au+lait").unwrap();
///
/// // Comparisons are made on the decoded text.
/// assert!(encoded == "café au lait");
/// assert!(encoded == EncodedStr::new("caf%c3%a9%20au%20lait").unwrap());
///
/// // The underlying string is unchanged.
/// assert_eq!(encoded.as_str(), "caf%C3%A9+au+lait");
///
/// assert_eq!(encoded.decode(), "café au lait");
/// ```
#[repr(transparent)]
pub struct EncodedStr {
	data: str,
}

impl EncodedStr {
	/// Create a new form-encoded string slice.
	///
	/// The input is checked the way [`decode`](fn@crate::decode) checks it, and
	/// the same error is returned if it is not valid.
	pub fn new<S: AsRef<str> + ?Sized>(str: &S) -> Result<&EncodedStr, DecodeError> {
		let str = str.as_ref();
		check(str)?;
		Ok(unsafe { Self::new_unchecked(str) })
	}

	/// Create a new form-encoded string slice without checking it.
	///
	/// # Safety
	///
	/// The input must be accepted by [`EncodedStr::new`].
	pub unsafe fn new_unchecked<S: AsRef<str> + ?Sized>(str: &S) -> &EncodedStr {
		&*(str.as_ref() as *const str as *const EncodedStr)
	}

	/// Length of the encoded string slice, in bytes.
	#[inline]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Get the underlying encoded string slice.
	#[inline]
	pub fn as_str(&self) -> &str {
		&self.data
	}

	/// Iterate over the decoded bytes.
	#[inline]
	pub fn bytes(&self) -> Bytes {
		Bytes {
			data: self.data.as_bytes(),
			position: 0,
		}
	}

	/// Iterate over the decoded characters.
	#[inline]
	pub fn chars(&self) -> Chars {
		Chars {
			inner: utf8_decode::Decoder::new(self.bytes()),
		}
	}

	/// Return the decoded string.
	pub fn decode(&self) -> String {
		self.chars().collect()
	}
}

impl PartialEq for EncodedStr {
	#[inline]
	fn eq(&self, other: &EncodedStr) -> bool {
		self.chars().eq(other.chars())
	}
}

impl Eq for EncodedStr {}

impl PartialEq<str> for EncodedStr {
	#[inline]
	fn eq(&self, other: &str) -> bool {
		self.chars().eq(other.chars())
	}
}

impl PartialEq<&str> for EncodedStr {
	#[inline]
	fn eq(&self, other: &&str) -> bool {
		self.chars().eq(other.chars())
	}
}

impl PartialEq<EncodedString> for EncodedStr {
	#[inline]
	fn eq(&self, other: &EncodedString) -> bool {
		self.chars().eq(other.chars())
	}
}

impl PartialOrd for EncodedStr {
	fn partial_cmp(&self, other: &EncodedStr) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for EncodedStr {
	fn cmp(&self, other: &EncodedStr) -> Ordering {
		self.chars().cmp(other.chars())
	}
}

impl hash::Hash for EncodedStr {
	#[inline]
	fn hash<H: hash::Hasher>(&self, hasher: &mut H) {
		for c in self.chars() {
			c.hash(hasher)
		}
	}
}

impl fmt::Display for EncodedStr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&self.data, f)
	}
}

impl fmt::Debug for EncodedStr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&self.data, f)
	}
}

impl AsRef<str> for EncodedStr {
	#[inline]
	fn as_ref(&self) -> &str {
		&self.data
	}
}

impl<'a> TryFrom<&'a str> for &'a EncodedStr {
	type Error = DecodeError;

	fn try_from(value: &'a str) -> Result<Self, Self::Error> {
		EncodedStr::new(value)
	}
}

/// Owned form-encoded string.
///
/// This is the equivalent of [`String`] for [`EncodedStr`], to which it
/// dereferences.
///
/// ```
/// use pct_form::EncodedString;
///
/// let encoded = EncodedString::encode("flambé au rhum");
/// assert_eq!(encoded.as_str(), "flamb%C3%A9+au+rhum");
/// assert!(encoded == "flambé au rhum");
/// ```
#[derive(Clone)]
pub struct EncodedString {
	data: String,
}

impl EncodedString {
	/// Create a new owned form-encoded string.
	///
	/// The input is checked and copied.
	pub fn new<S: AsRef<str> + ?Sized>(str: &S) -> Result<EncodedString, DecodeError> {
		Ok(Self {
			data: EncodedStr::new(str)?.data.to_string(),
		})
	}

	/// Form-encode the given string with UTF-8.
	pub fn encode(src: &str) -> EncodedString {
		EncodedString {
			data: encode(src).into_owned(),
		}
	}

	#[inline]
	pub fn as_encoded_str(&self) -> &EncodedStr {
		unsafe { EncodedStr::new_unchecked(&self.data) }
	}

	/// Return the internal string, consuming the `EncodedString`.
	#[inline]
	pub fn into_string(self) -> String {
		self.data
	}
}

impl std::ops::Deref for EncodedString {
	type Target = EncodedStr;

	#[inline]
	fn deref(&self) -> &EncodedStr {
		self.as_encoded_str()
	}
}

impl Borrow<EncodedStr> for EncodedString {
	#[inline]
	fn borrow(&self) -> &EncodedStr {
		self.as_encoded_str()
	}
}

impl PartialEq for EncodedString {
	#[inline]
	fn eq(&self, other: &EncodedString) -> bool {
		self.as_encoded_str() == other.as_encoded_str()
	}
}

impl Eq for EncodedString {}

impl PartialEq<EncodedStr> for EncodedString {
	#[inline]
	fn eq(&self, other: &EncodedStr) -> bool {
		self.as_encoded_str() == other
	}
}

impl PartialEq<str> for EncodedString {
	#[inline]
	fn eq(&self, other: &str) -> bool {
		self.as_encoded_str() == other
	}
}

impl PartialEq<&str> for EncodedString {
	#[inline]
	fn eq(&self, other: &&str) -> bool {
		self.as_encoded_str() == *other
	}
}

impl PartialOrd for EncodedString {
	fn partial_cmp(&self, other: &EncodedString) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for EncodedString {
	fn cmp(&self, other: &EncodedString) -> Ordering {
		self.as_encoded_str().cmp(other.as_encoded_str())
	}
}

impl hash::Hash for EncodedString {
	#[inline]
	fn hash<H: hash::Hasher>(&self, hasher: &mut H) {
		self.as_encoded_str().hash(hasher)
	}
}

impl fmt::Display for EncodedString {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(self.as_str(), f)
	}
}

impl fmt::Debug for EncodedString {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(self.as_str(), f)
	}
}

impl FromStr for EncodedString {
	type Err = DecodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl TryFrom<String> for EncodedString {
	type Error = DecodeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		EncodedStr::new(&value)?;
		Ok(Self { data: value })
	}
}

impl TryFrom<&str> for EncodedString {
	type Error = DecodeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		value.parse()
	}
}
