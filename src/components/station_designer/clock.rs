use chrono::{DateTime, Utc};

/// Millisecond wall clock used for node and design ids.
pub trait Clock {
	fn now_ms(&self) -> u64;
}

/// Browser clock on wasm, system clock elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	#[cfg(target_arch = "wasm32")]
	fn now_ms(&self) -> u64 {
		js_sys::Date::now() as u64
	}

	#[cfg(not(target_arch = "wasm32"))]
	fn now_ms(&self) -> u64 {
		std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_millis() as u64)
			.unwrap_or_default()
	}
}

impl<C: Clock + ?Sized> Clock for &C {
	fn now_ms(&self) -> u64 {
		(**self).now_ms()
	}
}

/// RFC 3339 rendering of a millisecond timestamp, for `createdAt`.
pub fn rfc3339(ms: u64) -> String {
	DateTime::<Utc>::from_timestamp_millis(ms as i64)
		.unwrap_or_default()
		.to_rfc3339()
}

/// Default name for a design started at `ms`.
pub fn new_design_name(ms: u64) -> String {
	let when = DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_default();
	format!("New Design - {}", when.format("%Y-%m-%d %H:%M"))
}
