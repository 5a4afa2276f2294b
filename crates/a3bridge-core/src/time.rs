//! Wall-clock stamps handed to the host.

use chrono::Utc;

/// Current UTC time in nanoseconds since the Unix epoch.
///
/// Saturates to zero outside the range `i64` nanoseconds can represent.
#[must_use]
pub fn timestamp_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// [`timestamp_nanos`] rendered as decimal text.
#[must_use]
pub fn timestamp_string() -> String {
    timestamp_nanos().to_string()
}
