use axum::extract::State;
use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
	extract::{Json, Path, Query, Session},
	model,
	openapi::tag,
	route::model::{IdInput, SearchInput},
	store::content,
	AppState, Database,
};

use super::RouteError;

#[derive(Serialize, JsonSchema)]
pub struct UpvoteOutput {
	/// The number of upvotes after this one.
	pub upvotes: i64,
}

/// Get all posts
/// Returns every post, oldest first. If a query is given, only posts whose title or author contains it are returned.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(search): Query<SearchInput>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = content::search_posts(&database, search.query()).await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = content::get_post(&database, path.id).await?;

	Ok(Json(post))
}

/// Create post
/// Creates a new post as the authenticated user.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(state): State<AppState>,
	session: Session,
	Json(input): Json<model::CreatePost>,
) -> Result<Json<model::Post>, RouteError> {
	let post =
		content::create_post(&state.database, state.clock.as_ref(), &session.user, &input).await?;

	Ok(Json(post))
}

/// Upvote post
/// Adds one upvote to a post, returning the new count.
#[route(tag = tag::POST)]
pub async fn upvote_post(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
) -> Result<Json<UpvoteOutput>, RouteError> {
	let upvotes = content::upvote(&database, path.id).await?;

	Ok(Json(UpvoteOutput { upvotes }))
}
