use cookie::{Cookie, SameSite};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Creates a session cookie with no expiry.
///
/// The cookie is only marked `Secure` in release builds, so it can be
/// used over plain HTTP during development.
pub fn create_cookie(session_id: Uuid) -> Cookie<'static> {
	Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> Cookie<'static> {
	Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Finds the session id among the `Cookie` header values.
///
/// Returns `None` when there is no session cookie or its value is not a session id.
pub fn find_session_id<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Uuid> {
	headers
		.into_iter()
		.flat_map(Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME)
		.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_create_cookie() {
		let id = Uuid::new_v4();
		let cookie = create_cookie(id).to_string();

		assert!(cookie.starts_with(&format!("session={id}")));
		assert!(cookie.contains("HttpOnly"));
		assert!(cookie.contains("Path=/"));
	}

	#[test]
	fn test_clear_cookie_expires() {
		assert!(clear_cookie().to_string().contains("Max-Age=0"));
	}

	#[test]
	fn test_find_session_id() {
		let id = Uuid::new_v4();
		let header = format!("theme=dark; session={id}");

		assert_eq!(find_session_id([header.as_str()]), Some(id));
		assert_eq!(find_session_id(["theme=dark"]), None);
		assert_eq!(find_session_id(["session=not-a-uuid"]), None);
	}
}
