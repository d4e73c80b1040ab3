extern crate pct_form;

use pct_form::{Charset, Encoder, UriUnreserved};

struct KeepSlashes;

impl Encoder for KeepSlashes {
	fn encode(&self, c: char) -> bool {
		c != '/' && UriUnreserved.encode(c)
	}
}

fn main() -> Result<(), pct_form::UnsupportedEncoding> {
	// Form encoding with UTF-8: spaces become `+`.
	println!("{}", pct_form::encode("flambé au rhum"));
	// => flamb%C3%A9+au+rhum

	// Any charset of the Encoding Standard can be used instead.
	let latin1 = Charset::for_label("iso-8859-1")?;
	println!("{}", pct_form::encode_with_charset("flambé au rhum", latin1));
	// => flamb%E9+au+rhum

	// [`UriUnreserved`] writes spaces as `%20`, for paths.
	println!(
		"{}",
		pct_form::encode_with("/docs/my file.txt", Charset::utf_8(), &UriUnreserved)
	);
	// => %2Fdocs%2Fmy%20file.txt

	// Or choose the characters yourself by implementing [`Encoder`].
	println!(
		"{}",
		pct_form::encode_with("/docs/my file.txt", Charset::utf_8(), &KeepSlashes)
	);
	// => /docs/my%20file.txt

	Ok(())
}
