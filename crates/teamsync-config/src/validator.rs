//! Value-level validation for configuration inputs.

use crate::defaults::ENV_GUILD_ID;
use crate::loader::ConfigError;
use std::num::NonZeroU64;

/// Returns the trimmed value when it is present and non-blank.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a guild id. Guild ids are positive integers.
pub fn parse_guild_id(raw: &str) -> Result<NonZeroU64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| ConfigError::InvalidGuildId {
            var: ENV_GUILD_ID,
            value: raw.to_string(),
        })
}

/// Basic shape check for a bot token: three non-empty dot-separated parts.
///
/// Failing this check is not fatal; the gateway is the authority on tokens.
pub fn token_looks_valid(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|part| !part.is_empty())
}
