use sha2::{Digest, Sha256};

pub fn hash_token(token: &str) -> String {
  format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Whether `token` matches one of the configured token digests.
pub fn is_authorized(token_hashes: &[String], token: &str) -> bool {
  let hash = hash_token(token);
  token_hashes.iter().any(|known| *known == hash)
}

/// Split a comma-separated token list and hash every non-empty entry.
pub fn parse_token_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(hash_token)
    .collect()
}
