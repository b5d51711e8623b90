//! Session credentials: opaque link tokens and human-typeable check-in codes.

use anyhow::Context;
use rand::rngs::OsRng;
use rand::TryRngCore;

/// Uppercase letters and digits without the look-alikes `0 O 1 I`.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

// A byte maps onto the alphabet without modulo bias only if the alphabet size divides 256.
const _: () = assert!(256 % CODE_ALPHABET.len() == 0);

pub const CODE_LEN: usize = 8;
const TOKEN_BYTES: usize = 32;
const REFERENCE_LEN: usize = 6;

/// 256 bits from the OS entropy source, hex encoded.
pub fn generate_token() -> anyhow::Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("entropy source unavailable")?;
    Ok(hex::encode(bytes))
}

/// A fresh check-in code, already formatted as `XXXX-XXXX`.
pub fn generate_checkin_code() -> anyhow::Result<String> {
    let raw = random_symbols(CODE_LEN)?;
    Ok(format_code(&raw))
}

/// Human-facing booking reference such as `BK-7QX2MD`.
pub fn generate_booking_reference() -> anyhow::Result<String> {
    Ok(format!("BK-{}", random_symbols(REFERENCE_LEN)?))
}

fn random_symbols(len: usize) -> anyhow::Result<String> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("entropy source unavailable")?;
    Ok(bytes
        .iter()
        .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
        .collect())
}

/// Strips everything but ASCII letters and digits and uppercases the rest.
pub fn normalize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Inserts the readability hyphen. Expects an already normalized code.
pub fn format_code(normalized: &str) -> String {
    if normalized.len() != CODE_LEN {
        return normalized.to_string();
    }
    let (head, tail) = normalized.split_at(CODE_LEN / 2);
    format!("{head}-{tail}")
}

/// Normalizes user input into the stored `XXXX-XXXX` form, or `None` if it
/// cannot be a check-in code.
pub fn parse_code(input: &str) -> Option<String> {
    let normalized = normalize_code(input);
    (normalized.len() == CODE_LEN).then(|| format_code(&normalized))
}
