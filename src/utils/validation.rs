use crate::error::ClientError;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is when a token is placed in a URL path segment.
const TOKEN_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Validates an access token before it is used in a request path.
///
/// Tokens are opaque, but the service addresses files by a single path
/// segment, so an empty token or one containing `/` can never be valid.
pub fn validate_token(token: &str) -> Result<(), ClientError> {
    if token.trim().is_empty() {
        return Err(ClientError::InvalidToken("token is empty".to_string()));
    }
    if token.contains('/') {
        return Err(ClientError::InvalidToken(format!(
            "token must not contain '/': {}",
            token
        )));
    }
    // URL parsing resolves `.` and `..` segments, even percent-encoded ones.
    if token.chars().all(|c| c == '.') {
        return Err(ClientError::InvalidToken(format!(
            "token must not be a dot segment: {}",
            token
        )));
    }
    Ok(())
}

/// Percent-encodes a token as a single path segment.
pub fn encode_token_segment(token: &str) -> String {
    utf8_percent_encode(token, TOKEN_SEGMENT).to_string()
}
