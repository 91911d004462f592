use std::{borrow::Borrow, collections::HashMap, fmt};
use tracing::{debug, info};

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const BASE_CODE_LEN: usize = 6;

/// Shareable stand-in for a wallet address: six base62 characters plus an
/// optional disambiguation suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ShortCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Session-scoped mapping between wallet addresses and their short codes.
///
/// Both maps only grow. Every code in `by_code` points back to the address
/// that produced it through `by_address`.
#[derive(Debug, Default)]
pub struct ReferralRegistry {
    by_address: HashMap<String, ShortCode>,
    by_code: HashMap<ShortCode, String>,
}

impl ReferralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `address`, assigning one on first use.
    ///
    /// The caller is responsible for validating the address shape.
    pub fn assign_code(&mut self, address: &str) -> ShortCode {
        if let Some(existing) = self.by_address.get(address) {
            return existing.clone();
        }

        let base = base_code(address);
        let mut candidate = base.clone();
        let mut counter = 0usize;
        while self.by_code.contains_key(candidate.as_str()) {
            candidate = ShortCode(format!("{}{}", base.0, suffix(counter)));
            counter += 1;
        }
        if counter > 0 {
            debug!(base = %base, code = %candidate, probes = counter, "short code collision resolved");
        }

        self.by_address
            .insert(address.to_string(), candidate.clone());
        self.by_code.insert(candidate.clone(), address.to_string());
        info!(code = %candidate, "assigned referral code");
        candidate
    }

    pub fn resolve_code(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

/// Six base62 symbols derived from a 31x string hash of the address.
///
/// The hash wraps at 32 bits like a signed integer accumulator; its absolute
/// value is taken in a wider type so `i32::MIN` keeps its magnitude. Low
/// alphabet symbols come up more often in the leading positions.
pub fn base_code(address: &str) -> ShortCode {
    let hash = address.encode_utf16().fold(0i32, |acc, unit| {
        acc.wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(i32::from(unit))
    });
    let mut value = i64::from(hash).unsigned_abs();
    let mut symbols = [0u8; BASE_CODE_LEN];
    for slot in symbols.iter_mut().rev() {
        *slot = ALPHABET[(value % 62) as usize];
        value /= 62;
    }
    ShortCode(symbols.iter().map(|&b| b as char).collect())
}

/// Disambiguation suffix for the `n`th probe. The first 62 probes use a
/// single symbol; later ones grow to two or more symbols (bijective base62).
fn suffix(n: usize) -> String {
    let mut k = n + 1;
    let mut out = Vec::new();
    while k > 0 {
        k -= 1;
        out.push(ALPHABET[k % 62]);
        k /= 62;
    }
    out.iter().rev().map(|&b| b as char).collect()
}
