use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::extract::Json;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A short, machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional structured information about the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Default::default)
			.to_mut()
			.insert(key.into(), value.into());
		self
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub errors: Vec<Message<'a>>,
}

/// Describes how a domain error is presented to the client.
///
/// Server errors (5xx) are logged, and their messages are replaced
/// with an opaque one before being sent.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>>;
}

/// Converts validation errors into one message per failed rule.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'_>> {
	errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			errors.iter().map(move |error| Message {
				content: Cow::Borrowed(error.code.as_ref()),
				field: Some(Cow::Owned(field.to_string())),
				details: None,
			})
		})
		.collect()
}

fn respond(shape: &impl ErrorShape) -> Response<Body> {
	let status = shape.status();

	let errors = if status.is_server_error() {
		tracing::error!(error = %shape, "request failed");
		vec![Message::new("internal_error")]
	} else {
		shape.errors()
	};

	(status, Json(ErrorResponse { errors })).into_response()
}

/// Errors that are not specific to a single route, mostly extractor rejections.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json body rejected")]
	Json(Response<Body>),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Json(response) => response.status(),
			Self::Query(rejection) => rejection.status(),
			Self::Path(rejection) => rejection.status(),
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => validation_messages(errors),
			Self::Query(rejection) => vec![Message::new(rejection.body_text())],
			Self::Path(rejection) => vec![Message::new(rejection.body_text())],
			Self::Json(..) | Self::Database(..) => Vec::new(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		match self {
			// axum-jsonschema already renders a descriptive body
			Self::Json(response) => response,
			error => respond(&error),
		}
	}
}

/// The error returned from a route, either a shared [`AppError`] or the route's own error.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E> {
	#[error(transparent)]
	App(#[from] AppError),
	#[error(transparent)]
	Route(E),
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E> IntoResponse for RouteError<E>
where
	E: ErrorShape,
{
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => respond(&error),
		}
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 1))]
		name: String,
	}

	#[test]
	fn test_validation_messages_name_field() {
		let errors = Input {
			name: String::new(),
		}
		.validate()
		.unwrap_err();

		let messages = validation_messages(&errors);

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].content, "length");
		assert_eq!(messages[0].field.as_deref(), Some("name"));
	}

	#[test]
	fn test_message_builder() {
		let message = Message::new("unknown_post").field("id").detail("post", 4);

		assert_eq!(message.field.as_deref(), Some("id"));
		assert_eq!(
			message.details.unwrap().get("post"),
			Some(&serde_json::json!(4))
		);
	}

	#[test]
	fn test_database_errors_are_opaque() {
		let response = AppError::Database(sqlx::Error::RowNotFound).into_response();

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
