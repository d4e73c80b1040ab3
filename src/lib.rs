//! Percent-encoding for `application/x-www-form-urlencoded` payloads.
//!
//! This crate converts Unicode text to and from the US-ASCII representation
//! used in URL query strings and HTML form submissions, where bytes are
//! written as `%XX` escape sequences and spaces as `+`
//! (see [RFC 3986](https://tools.ietf.org/html/rfc3986) and the
//! [URL Standard](https://url.spec.whatwg.org/#application/x-www-form-urlencoded)).
//!
//! It does not parse or build URIs. It only encodes and decodes their
//! character payload.
//!
//! # Basic usage
//!
//! ```
//! use pct_form::{decode, encode};
//!
//! let encoded = encode("flambé au rhum");
//! assert_eq!(encoded, "flamb%C3%A9+au+rhum");
//!
//! let decoded = decode(&encoded).unwrap();
//! assert_eq!(decoded, "flambé au rhum");
//! ```
//!
//! Both functions return a [`Cow`](std::borrow::Cow) that borrows the input
//! when there is nothing to transform.
//!
//! # Charsets
//!
//! Characters are turned into bytes with UTF-8 by default. Any other
//! [`Charset`] can be resolved from its label.
//!
//! ```
//! use pct_form::{decode_with_charset, encode_with_charset, Charset};
//!
//! let latin1 = Charset::for_label("iso-8859-1").unwrap();
//! assert_eq!(encode_with_charset("flambé", latin1), "flamb%E9");
//! assert_eq!(decode_with_charset("flamb%E9", latin1).unwrap(), "flambé");
//! ```
//!
//! # Strict and lenient decoding
//!
//! [`decode`] rejects malformed escape sequences such as `%HH`.
//! [`lenient_decode`] keeps them as they are, which is useful for input coming
//! from sources that do not escape `%` consistently.
//!
//! ```
//! use pct_form::{decode, lenient_decode, Charset};
//!
//! assert!(decode("50%+off").is_err());
//! assert_eq!(lenient_decode("50%+off", Charset::utf_8(), true).unwrap(), "50% off");
//! assert_eq!(lenient_decode("50%+off", Charset::utf_8(), false).unwrap(), "50%+off");
//! ```
//!
//! # Custom character sets
//!
//! Which characters are encoded is decided by an [`Encoder`].
//! [`FormUnreserved`] is used by [`encode`], [`UriUnreserved`] suits path
//! segments.
//!
//! ```
//! use pct_form::{encode_with, Charset, UriUnreserved};
//!
//! let segment = encode_with("my file~1.txt", Charset::utf_8(), &UriUnreserved);
//! assert_eq!(segment, "my%20file~1.txt");
//! ```
//!
//! # Encoded strings
//!
//! [`EncodedStr`] and [`EncodedString`] carry text that is already known to be
//! validly encoded, and compare by decoded content.
//!
//! ```
//! use pct_form::EncodedStr;
//!
//! let a = EncodedStr::new("Hello+World%21").unwrap();
//! let b = EncodedStr::new("Hello%20World!").unwrap();
//! assert_eq!(a, b);
//! assert!(a == "Hello World!");
//! ```

mod charset;
mod decode;
mod encode;
mod encoded;
mod error;

pub use charset::*;
pub use decode::{decode, decode_with_charset, lenient_decode};
pub use encode::*;
pub use encoded::*;
pub use error::*;
