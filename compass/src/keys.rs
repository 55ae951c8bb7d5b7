//! Cache key derivation.
//!
//! Keys have the shape `booking:{type}:{id}` and, when parameters are present,
//! a trailing `:{json}` where the JSON object has its keys sorted by name. Two
//! parameter bags with the same contents always map to the same key no matter
//! the order they were built in.
//!
//! Neither `type` nor `id` is escaped: an id containing `:` produces a key that
//! may collide with a different (type, id) split.

use serde_json::Value;
use std::collections::BTreeMap;

pub const KEY_PREFIX: &str = "booking";

/// Parameter bag used for key derivation. Ordered by key name.
pub type CacheParams = BTreeMap<String, Value>;

pub fn derive_key(kind: &str, id: &str, params: &CacheParams) -> String {
    if params.is_empty() {
        return format!("{}:{}:{}", KEY_PREFIX, kind, id);
    }

    // A BTreeMap serializes in key order, which is the canonical form.
    let canonical = serde_json::to_string(params).unwrap_or_else(|_| String::from("{}"));
    format!("{}:{}:{}:{}", KEY_PREFIX, kind, id, canonical)
}

/// Build a [`CacheParams`] from any sequence of pairs, dropping `Null` values
/// so that "absent" and "explicitly empty" optional parameters derive the same key.
pub fn canonical_params<I, K, V>(pairs: I) -> CacheParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(_, v)| !v.is_null())
        .collect()
}

/// True when `key` was derived for exactly `id`, whatever its type and parameters.
pub fn key_has_id(key: &str, id: &str) -> bool {
    let Some((_, rest)) = key
        .strip_prefix(KEY_PREFIX)
        .and_then(|k| k.strip_prefix(':'))
        .and_then(|k| k.split_once(':'))
    else {
        return false;
    };
    match rest.strip_prefix(id) {
        Some(tail) => tail.is_empty() || tail.starts_with(':'),
        None => false,
    }
}

/// Globs selecting the keys [`key_has_id`] accepts: with and without a parameter part.
pub fn id_globs(id: &str) -> [String; 2] {
    let id = escape_glob(id);
    [
        format!("{}:*:{}", KEY_PREFIX, id),
        format!("{}:*:{}:*", KEY_PREFIX, id),
    ]
}

/// Backslash-escape the glob metacharacters in `text`.
pub fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Redis-style glob: `*` matches any run of characters, `?` exactly one and
/// `\` makes the next character literal.
pub fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` seen and the text index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p).copied() {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some('?') => Some(1),
            Some('\\') if pattern.get(p + 1) == Some(&text[t]) => Some(2),
            Some('\\') => None,
            Some(c) if c == text[t] => Some(1),
            _ => None,
        };
        match (step, backtrack) {
            (Some(width), _) => {
                p += width;
                t += 1;
            }
            (None, Some((star, matched))) => {
                p = star + 1;
                t = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            (None, None) => return false,
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
