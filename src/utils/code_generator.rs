//! Sequential short code generation.
//!
//! Short codes are strings over a fixed 62-symbol alphabet ordered as digits,
//! then lowercase letters, then uppercase letters. Codes are handed out in
//! allocation order starting from [`SEED_CODE`], each one the [`successor`] of
//! the previous.

/// Code alphabet in ordinal order: `0` is the lowest symbol, `Z` the highest.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Code assigned to the very first link.
pub const SEED_CODE: &str = "0000";

/// Returns the ordinal position of `symbol` in [`ALPHABET`].
fn ordinal(symbol: u8) -> Option<usize> {
    match symbol {
        b'0'..=b'9' => Some((symbol - b'0') as usize),
        b'a'..=b'z' => Some((symbol - b'a') as usize + 10),
        b'A'..=b'Z' => Some((symbol - b'A') as usize + 36),
        _ => None,
    }
}

/// Returns true if `code` is non-empty and made only of alphabet symbols.
///
/// Anything else can never have been allocated, so callers may treat it as
/// unknown without asking the store.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| ordinal(b).is_some())
}

/// Computes the code that follows `code` in allocation order.
///
/// Scans from the rightmost symbol: `Z` wraps to `0` and carries left, any
/// other symbol steps to the next one and stops. When every symbol carried,
/// a leading `0` is prepended and the code grows by one.
///
/// Returns `None` if `code` is empty or contains a symbol outside the
/// alphabet.
///
/// # Examples
///
/// ```
/// use seqlink::utils::code_generator::successor;
///
/// assert_eq!(successor("0009").as_deref(), Some("000a"));
/// assert_eq!(successor("000Z").as_deref(), Some("0010"));
/// assert_eq!(successor("ZZZZ").as_deref(), Some("00000"));
/// ```
pub fn successor(code: &str) -> Option<String> {
    if !is_valid_code(code) {
        return None;
    }

    let mut symbols = code.as_bytes().to_vec();

    for i in (0..symbols.len()).rev() {
        let position = ordinal(symbols[i])?;
        if position + 1 < ALPHABET.len() {
            symbols[i] = ALPHABET[position + 1];
            return String::from_utf8(symbols).ok();
        }
        symbols[i] = ALPHABET[0];
    }

    let mut grown = Vec::with_capacity(symbols.len() + 1);
    grown.push(ALPHABET[0]);
    grown.extend_from_slice(&symbols);
    String::from_utf8(grown).ok()
}
