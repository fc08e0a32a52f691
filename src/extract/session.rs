use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::RouteError,
	model::User,
	openapi::SECURITY_SCHEME_SESSION,
	route::auth,
	session,
	store::{credential, session as sessions},
	Database,
};

/// The identity bound to a request.
///
/// A request without a session cookie, or with a cookie for a session that
/// no longer exists, is [`Identity::Anonymous`]. A session whose user can no
/// longer be loaded fails the request with [`credential::Error::UnknownUser`].
///
/// ```rust,ignore
/// async fn route(identity: Identity) {
///   if let Identity::User { user, .. } = identity {
///     println!("{}", user.name);
///   }
/// }
/// ```
#[derive(Debug)]
pub enum Identity {
	User { session: Uuid, user: User },
	Anonymous,
}

impl Identity {
	/// Requires the identity to be bound to a user.
	pub fn require(self) -> Result<Session, auth::Error> {
		match self {
			Self::User { session, user } => Ok(Session { id: session, user }),
			Self::Anonymous => Err(auth::Error::Unauthenticated),
		}
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let cookies = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok());

		let Some(session_id) = session::find_session_id(cookies) else {
			return Ok(Self::Anonymous);
		};

		let database = Database::from_ref(state);

		let Some(user_id) = sessions::resolve(&database, session_id).await? else {
			tracing::debug!(%session_id, "stale session cookie");
			return Ok(Self::Anonymous);
		};

		let user = credential::load_by_id(&database, user_id)
			.await
			.map_err(auth::Error::from)?;

		Ok(Self::User {
			session: session_id,
			user,
		})
	}
}

/// Extracts the session and related user from the request.
///
/// If the request is anonymous, an [`auth::Error::Unauthenticated`] is returned.
///
/// ```rust,ignore
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Identity::from_request_parts(parts, state).await?.require()?)
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
