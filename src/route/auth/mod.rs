use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, store::credential, AppState};

pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Credential(#[from] credential::Error),
	#[error("authentication required")]
	Unauthenticated,
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

impl From<credential::Error> for RouteError {
	fn from(error: credential::Error) -> Self {
		Self::Route(Error::Credential(error))
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		use credential::Error as E;

		match self {
			Self::Credential(E::Validation(..)) => StatusCode::BAD_REQUEST,
			Self::Credential(E::EmailTaken) => StatusCode::CONFLICT,
			Self::Credential(E::UnknownEmail | E::BadCredential | E::UnknownUser(..))
			| Self::Unauthenticated => StatusCode::UNAUTHORIZED,
			Self::Credential(E::Hash(..) | E::Database(..)) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		use credential::Error as E;

		let message = match self {
			Self::Credential(E::Validation(errors)) => return error::validation_messages(errors),
			// an unknown email is indistinguishable from a wrong password
			Self::Credential(E::UnknownEmail | E::BadCredential) => {
				error::Message::new("invalid_email_or_password")
			}
			Self::Credential(E::EmailTaken) => error::Message::new("email_taken").field("email"),
			Self::Credential(E::UnknownUser(..)) => error::Message::new("unknown_user"),
			Self::Credential(E::Hash(..) | E::Database(..)) => return Vec::new(),
			Self::Unauthenticated => error::Message::new("unauthenticated"),
		};

		vec![message]
	}
}
