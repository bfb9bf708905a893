//! Time helpers.

/// Current UNIX timestamp in seconds.
pub fn current_timestamp() -> u64 {
	chrono::Utc::now().timestamp().max(0) as u64
}
