use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod route;

pub use crate::store::content::Error;

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/:id", get_with(get_post, get_post_docs))
		.api_route("/:id/upvote", post_with(upvote_post, upvote_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::Validation(errors) => error::validation_messages(errors),
			Self::UnknownPost(post) => {
				vec![error::Message::new("unknown_post").detail("post", *post)]
			}
			Self::Database(..) => Vec::new(),
		}
	}
}
