use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Accepts naive ISO-8601 (what the backend emits) as well as offset timestamps.
pub(super) fn optional<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let Some(raw) = Option::<String>::deserialize(deserializer)? else {
		return Ok(None);
	};
	if let Ok(naive) = raw.parse::<NaiveDateTime>() {
		return Ok(Some(naive));
	}
	DateTime::parse_from_rfc3339(&raw)
		.map(|dt| Some(dt.naive_utc()))
		.map_err(serde::de::Error::custom)
}
