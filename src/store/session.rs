use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::model::Session;

/// Creates a new session for the user.
pub async fn create(executor: impl SqliteExecutor<'_>, user_id: i64) -> Result<Session, sqlx::Error> {
	let session = sqlx::query_as::<_, Session>(
		r#"
			INSERT INTO session (id, user_id, created_at) VALUES (?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(chrono::Utc::now())
	.fetch_one(executor)
	.await?;

	tracing::debug!(user_id, "created session");

	Ok(session)
}

/// Returns the id of the user bound to the session, if the session exists.
pub async fn resolve(
	executor: impl SqliteExecutor<'_>,
	session_id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
	sqlx::query_scalar("SELECT user_id FROM session WHERE id = ?")
		.bind(session_id)
		.fetch_optional(executor)
		.await
}

/// Deletes the session, returning whether it existed.
pub async fn delete(executor: impl SqliteExecutor<'_>, session_id: Uuid) -> Result<bool, sqlx::Error> {
	let status = sqlx::query("DELETE FROM session WHERE id = ?")
		.bind(session_id)
		.execute(executor)
		.await?;

	Ok(status.rows_affected() > 0)
}
