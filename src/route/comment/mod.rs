use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod route;

pub use super::post::{Error, RouteError};

/// Routes nested under a single post.
pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/:id/comments",
		get_with(get_comments, get_comments_docs).post_with(create_comment, create_comment_docs),
	)
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn post(app: &TestServer) -> i64 {
		app.post("/auth/register")
			.json(&json!({
				"email": "a@x.com",
				"name": "Alice",
				"password": "p1",
			}))
			.await
			.assert_status_ok();

		app.post("/posts")
			.json(&json!({ "title": "T1", "description": "D1" }))
			.await
			.json::<serde_json::Value>()["id"]
			.as_i64()
			.unwrap()
	}

	#[sqlx::test]
	async fn test_comment_on_missing_post(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/posts/9/comments")
			.json(&json!({ "text": "orphan" }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(app.get("/posts/9/comments").await.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_blank_comment(pool: Database) {
		let app = app(pool);
		let id = post(&app).await;

		let response = app
			.post(&format!("/posts/{id}/comments"))
			.json(&json!({ "text": " \n " }))
			.await;

		assert_eq!(response.status_code(), 400);

		let comments = app
			.get(&format!("/posts/{id}/comments"))
			.await
			.json::<serde_json::Value>();

		assert!(comments.as_array().unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_comments_are_anonymous(pool: Database) {
		let app = app(pool);
		let id = post(&app).await;

		app.get("/auth/logout").await;

		let comment = app
			.post(&format!("/posts/{id}/comments"))
			.json(&json!({ "text": "first" }))
			.await
			.json::<serde_json::Value>();

		assert_eq!(comment["post_id"], id);
		assert_eq!(comment["text"], "first");
		assert!(comment.get("author").is_none());
	}
}
