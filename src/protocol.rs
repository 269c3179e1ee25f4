//! Wire codec for the number-sorting protocol.
//!
//! Messages are text, `\n`-delimited, one request/response pair per
//! connection:
//! - Request: `<int>,<int>,...,<int>\n`
//! - Success response: the same integers, ascending sorted
//! - Failure response: `ERROR: <message>\n`

use crate::error::ParseError;

/// Prefix marking a failure response on the wire.
pub const ERROR_PREFIX: &str = "ERROR:";

/// Encode a sequence of integers as a comma-joined line body.
///
/// No trailing delimiter and no newline; the caller appends `\n` when
/// framing for transmission. An empty slice encodes to an empty string.
pub fn encode_numbers(numbers: &[i64]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a request line into a sequence of integers.
///
/// The line is trimmed, split on `,`, and each token trimmed again. Empty
/// tokens (leading/trailing/doubled commas) are skipped. Decoding is
/// all-or-nothing: the first non-empty token that is not a base-10 integer
/// fails the whole line.
pub fn decode_numbers(line: &str) -> Result<Vec<i64>, ParseError> {
    let mut numbers = Vec::new();

    for token in line.trim().split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let num = token.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
        })?;
        numbers.push(num);
    }

    Ok(numbers)
}

/// Format a failure response body (no newline).
pub fn encode_error(message: &str) -> String {
    format!("{} {}", ERROR_PREFIX, message)
}

/// Check whether a response line carries a server-reported failure.
pub fn is_error_response(line: &str) -> bool {
    line.trim().starts_with(ERROR_PREFIX)
}
