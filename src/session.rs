//! Logged-in user, as left in session storage by the login flow.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

const USER_KEY: &str = "user";
const AUTH_FLAG_KEY: &str = "isAuthenticated";

/// The authenticated user the designer acts on behalf of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
	/// Id used in every design store path.
	pub user_id: String,
	/// Display name, when the login flow recorded one.
	pub first_name: Option<String>,
}

/// The stored user record. Backends disagree on the id field name.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
	#[serde(default)]
	user_id: Option<Value>,
	#[serde(default)]
	id: Option<Value>,
	#[serde(default, rename = "_id")]
	object_id: Option<Value>,
	#[serde(default)]
	first_name: Option<String>,
}

fn id_text(value: Option<Value>) -> Option<String> {
	match value? {
		Value::String(s) if !s.trim().is_empty() => Some(s),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Build the current user from the raw session entries.
///
/// Anything other than a `"true"` flag and a decodable user is treated as
/// logged out.
pub fn parse_session(user_json: Option<&str>, auth_flag: Option<&str>) -> Option<CurrentUser> {
	if auth_flag != Some("true") {
		return None;
	}
	let stored = match serde_json::from_str::<StoredUser>(user_json?) {
		Ok(stored) => stored,
		Err(e) => {
			warn!("ignoring unreadable session user: {e}");
			return None;
		}
	};
	let user_id = id_text(stored.user_id)
		.or_else(|| id_text(stored.id))
		.or_else(|| id_text(stored.object_id))?;
	Some(CurrentUser {
		user_id,
		first_name: stored.first_name,
	})
}

/// Read the current user from `window.sessionStorage`.
pub fn current_user() -> Option<CurrentUser> {
	let storage = web_sys::window()?.session_storage().ok()??;
	let user = storage.get_item(USER_KEY).ok()?;
	let flag = storage.get_item(AUTH_FLAG_KEY).ok()?;
	parse_session(user.as_deref(), flag.as_deref())
}
