extern crate pct_form;

use pct_form::{Charset, DecodeError};

fn main() -> Result<(), DecodeError> {
	// Strict decoding: `+` is a space, every `%` must start a valid escape.
	let decoded = pct_form::decode("caf%C3%A9+au+lait")?;
	println!("{}", decoded);
	// => café au lait

	if let Err(e) = pct_form::decode("50%+off") {
		println!("{}", e);
	}
	// => invalid percent-encoding segment at offset 2

	// Lenient decoding keeps malformed escapes as they are.
	let utf8 = Charset::utf_8();
	println!("{}", pct_form::lenient_decode("50%+off", utf8, true)?);
	// => 50% off
	println!("{}", pct_form::lenient_decode("50%+off%21", utf8, false)?);
	// => 50%+off!

	Ok(())
}
