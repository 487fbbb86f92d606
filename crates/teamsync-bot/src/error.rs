//! Application-wide error types using thiserror.

use serenity::gateway::GatewayError;
use serenity::model::ModelError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Discord rejected the bot token.
    #[error("Login failed: the bot token was rejected by Discord")]
    InvalidToken,

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// The gateway stopped before the session became ready.
    #[error("Gateway stopped before the session was ready")]
    NotReady,

    /// The gateway task itself failed.
    #[error("Gateway task failed: {0}")]
    Gateway(String),
}

impl BotError {
    /// Classifies an error returned by the gateway client, singling out
    /// rejected credentials.
    pub fn from_client(err: serenity::Error) -> Self {
        if is_authentication_failure(&err) {
            Self::InvalidToken
        } else {
            Self::Discord(err)
        }
    }
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;

/// Failure of a single platform call.
///
/// Authorization failures are kept apart because several callers treat them
/// differently from every other failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The bot lacks the permission the call needs.
    #[error("Missing permissions: {0}")]
    Forbidden(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Whether this is an authorization failure.
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<serenity::Error> for ApiError {
    fn from(err: serenity::Error) -> Self {
        let forbidden = match &err {
            serenity::Error::Http(e) => e.status_code().is_some_and(|s| s.as_u16() == 403),
            serenity::Error::Model(ModelError::InvalidPermissions { .. }) => true,
            _ => false,
        };

        if forbidden {
            Self::Forbidden(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

fn is_authentication_failure(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => true,
        serenity::Error::Http(e) => e.status_code().is_some_and(|s| s.as_u16() == 401),
        _ => false,
    }
}
