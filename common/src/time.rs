//! Timestamp formatting shared across the catalog and wire structs.

use chrono::Utc;

/// Returns the current time as an RFC 3339 / ISO 8601 string, the format
/// every timestamp field on the wire and in the snapshot uses.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}
