use cl_api_types::DenomTrace;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const IBC_PREFIX: &str = "ibc/";

/// Hex length of a SHA-256 digest.
pub const IBC_HASH_LEN: usize = 64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("not an ibc denom: {0}")]
    NotIbc(String),
    #[error("malformed ibc hash {hash:?}: {reason}")]
    MalformedHash { hash: String, reason: &'static str },
}

pub fn is_ibc_denom(denom: &str) -> bool {
    denom.starts_with(IBC_PREFIX)
}

/// Extracts and normalizes the hash of an `ibc/<hash>` denom.
///
/// The hash is returned uppercased, which is how chains print it and how
/// the persistent cache keys it.
pub fn parse_ibc_denom(denom: &str) -> Result<String, CodecError> {
    let Some(hash) = denom.strip_prefix(IBC_PREFIX) else {
        return Err(CodecError::NotIbc(denom.to_owned()));
    };

    if hash.len() != IBC_HASH_LEN {
        return Err(CodecError::MalformedHash {
            hash: hash.to_owned(),
            reason: "expected 64 hex characters",
        });
    }

    if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CodecError::MalformedHash {
            hash: hash.to_owned(),
            reason: "non-hex character",
        });
    }

    Ok(hash.to_ascii_uppercase())
}

/// `UPPERCASE_HEX(SHA-256("{path}/{base_denom}"))`
pub fn hash_for_trace(trace: &DenomTrace) -> String {
    let digest = Sha256::digest(trace.full_path().as_bytes());
    hex::encode_upper(digest)
}

pub fn verify_trace(hash: &str, trace: &DenomTrace) -> bool {
    hash_for_trace(trace).eq_ignore_ascii_case(hash)
}

/// Symbol shown for an IBC denom whose base denom is not in the registry.
pub fn placeholder_symbol(hash: &str) -> String {
    let head: String = hash.chars().take(6).collect();
    format!("IBC/{}", head.to_ascii_uppercase())
}

/// Shortens long denoms for narrow table cells: `ibc/27394F…5EB2`.
pub fn shorten_denom(denom: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let (prefix, body) = match denom.strip_prefix(IBC_PREFIX) {
        Some(hash) => (IBC_PREFIX, hash),
        None => ("", denom),
    };

    let chars: Vec<char> = body.chars().collect();
    if chars.len() <= HEAD + TAIL + 1 {
        return denom.to_owned();
    }

    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{prefix}{head}…{tail}")
}
