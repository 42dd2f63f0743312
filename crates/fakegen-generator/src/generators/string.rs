//! Bounded string generator.

use fakegen_core::FieldValue;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Number of distinct characters generated strings draw from.
pub const ALPHABET_SIZE: usize = 62;

/// Generate an alphanumeric string of exactly `length` characters.
pub fn alphanumeric<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Generate a string whose length is uniform over `[1, max_length]`.
pub fn generate_varchar<R: Rng + ?Sized>(rng: &mut R, max_length: usize) -> FieldValue {
    let length = rng.random_range(1..=max_length.max(1));
    FieldValue::String(alphanumeric(rng, length))
}
