use std::sync::Arc;

use aide::{
	axum::{
		routing::{get, get_with},
		ApiRouter, IntoApiResponse,
	},
	openapi::OpenApi,
	scalar::Scalar,
};
use axum::{response::IntoResponse, Extension};

use crate::extract::Json;

pub const SPEC_PATH: &str = "/docs/private/api.json";

pub fn routes() -> ApiRouter {
	ApiRouter::new()
		.api_route(
			"/",
			get_with(
				Scalar::new(SPEC_PATH)
					.with_title("Posting Board")
					.axum_handler(),
				|op| op.description("This documentation page."),
			),
		)
		.route("/private/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_openapi_document(pool: Database) {
		let response = app(pool).get("/docs/private/api.json").await;

		assert_eq!(response.status_code(), 200);

		let api = response.json::<serde_json::Value>();

		assert!(api["paths"]
			.as_object()
			.unwrap()
			.keys()
			.any(|path| path.ends_with("/upvote")));
		assert!(api["components"]["securitySchemes"]["Session"].is_object());
	}
}
