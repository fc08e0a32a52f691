use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path},
	model,
	openapi::tag,
	route::model::IdInput,
	store::content,
	Database,
};

use super::RouteError;

/// List comments
/// Returns the comments on a post, oldest first.
#[route(tag = tag::COMMENT)]
pub async fn get_comments(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
) -> Result<Json<Vec<model::Comment>>, RouteError> {
	let comments = content::list_comments(&database, path.id).await?;

	Ok(Json(comments))
}

/// Add comment
/// Adds an anonymous comment to a post.
#[route(tag = tag::COMMENT)]
pub async fn create_comment(
	State(database): State<Database>,
	Path(path): Path<IdInput>,
	Json(input): Json<model::CreateComment>,
) -> Result<Json<model::Comment>, RouteError> {
	let comment = content::add_comment(&database, path.id, &input).await?;

	Ok(Json(comment))
}
