extern crate pct_form;

use pct_form::{EncodedStr, EncodedString};

fn main() -> Result<(), pct_form::DecodeError> {
	// [`EncodedStr`] is a checked view over an encoded `str`.
	let encoded = EncodedStr::new("Hello+World%21")?;

	// It compares with regular strings by decoded content.
	assert!(encoded == "Hello World!");

	// The underlying string is unchanged.
	assert!(encoded.as_str() == "Hello+World%21");

	// Iterate over the decoded characters.
	for c in encoded.chars() {
		print!("{}", c);
	}
	println!();
	// => Hello World!

	// [`EncodedString`] owns its data.
	let owned = EncodedString::encode("Hello World!");
	println!("{}", owned);
	// => Hello+World%21

	assert!(owned == *encoded);
	println!("{}", owned.decode());

	Ok(())
}
