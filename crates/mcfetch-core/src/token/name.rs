//! Random registration token names.

use rand::Rng;

/// Length of a generated token name.
pub const TOKEN_NAME_LEN: usize = 8;

const ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Eight lowercase hex characters, each drawn independently (repeats allowed).
pub fn generate_token_name() -> String {
    generate_token_name_with(&mut rand::thread_rng())
}

pub fn generate_token_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_NAME_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
