//! Interview and dashboard access codes.

use rand::Rng;

/// Characters used in codes. Leaves out `I`, `O`, `0` and `1`, which are
/// easy to misread.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the candidate-facing code.
pub const INTERVIEW_CODE_LEN: usize = 6;

/// Length of the interviewer-facing code.
pub const DASHBOARD_CODE_LEN: usize = 8;

/// Generate a random code of `len` characters from [`CODE_ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Canonical form used for lookups: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
