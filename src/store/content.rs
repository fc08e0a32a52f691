use sqlx::SqliteExecutor;
use validator::Validate;

use crate::{
	clock::Clock,
	model::{Comment, CreateComment, CreatePost, Post, User},
	Database,
};

/// An error that can occur while reading or writing posts and comments.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

/// Escapes `LIKE` wildcards and wraps the query for a substring match.
fn like_pattern(query: &str) -> String {
	let mut pattern = String::with_capacity(query.len() + 2);

	pattern.push('%');

	for c in query.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}

		pattern.push(c);
	}

	pattern.push('%');
	pattern
}

/// Creates a post attributed to `author`, dated with the current time of `clock`.
pub async fn create_post(
	executor: impl SqliteExecutor<'_>,
	clock: &dyn Clock,
	author: &User,
	input: &CreatePost,
) -> Result<Post, Error> {
	input.validate()?;

	let post = sqlx::query_as::<_, Post>(
		r#"
			INSERT INTO post (title, description, date, author, avatar)
			VALUES (?, ?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(input.title.trim())
	.bind(input.description.trim())
	.bind(clock.post_date())
	.bind(&author.name)
	.bind(author.avatar)
	.fetch_one(executor)
	.await?;

	tracing::info!(
		monotonic_counter.posts_created = 1_u64,
		post_id = post.id,
		user_id = author.id,
		"created post"
	);

	Ok(post)
}

/// Returns every post, oldest first.
pub async fn list_posts(executor: impl SqliteExecutor<'_>) -> Result<Vec<Post>, Error> {
	let posts = sqlx::query_as::<_, Post>("SELECT * FROM post ORDER BY id")
		.fetch_all(executor)
		.await?;

	Ok(posts)
}

/// Returns the posts whose title or author contains `query`, ignoring case.
///
/// A blank query returns every post.
pub async fn search_posts(
	executor: impl SqliteExecutor<'_>,
	query: &str,
) -> Result<Vec<Post>, Error> {
	let query = query.trim();

	if query.is_empty() {
		return list_posts(executor).await;
	}

	let posts = sqlx::query_as::<_, Post>(
		r#"
			SELECT * FROM post
			WHERE title LIKE ?1 ESCAPE '\' OR author LIKE ?1 ESCAPE '\'
			ORDER BY id
		"#,
	)
	.bind(like_pattern(query))
	.fetch_all(executor)
	.await?;

	Ok(posts)
}

pub async fn get_post(executor: impl SqliteExecutor<'_>, post_id: i64) -> Result<Post, Error> {
	sqlx::query_as::<_, Post>("SELECT * FROM post WHERE id = ?")
		.bind(post_id)
		.fetch_optional(executor)
		.await?
		.ok_or(Error::UnknownPost(post_id))
}

/// Adds one upvote to the post, returning the new count.
///
/// The increment happens inside the `UPDATE`, so concurrent upvotes are never lost.
pub async fn upvote(executor: impl SqliteExecutor<'_>, post_id: i64) -> Result<i64, Error> {
	let upvotes = sqlx::query_scalar::<_, i64>(
		r#"
			UPDATE post SET upvotes = upvotes + 1
			WHERE id = ?
			RETURNING upvotes
		"#,
	)
	.bind(post_id)
	.fetch_optional(executor)
	.await?
	.ok_or(Error::UnknownPost(post_id))?;

	tracing::info!(monotonic_counter.upvotes = 1_u64, post_id, upvotes, "upvoted post");

	Ok(upvotes)
}

/// Returns the comments on the post, oldest first.
pub async fn list_comments(database: &Database, post_id: i64) -> Result<Vec<Comment>, Error> {
	let mut tx = database.begin().await?;

	get_post(&mut *tx, post_id).await?;

	let comments =
		sqlx::query_as::<_, Comment>("SELECT * FROM comment WHERE post_id = ? ORDER BY id")
			.bind(post_id)
			.fetch_all(&mut *tx)
			.await?;

	tx.commit().await?;

	Ok(comments)
}

/// Adds a comment to the post.
///
/// The existence check and the insert are one statement, so a comment
/// is never stored against a missing post.
pub async fn add_comment(
	executor: impl SqliteExecutor<'_>,
	post_id: i64,
	input: &CreateComment,
) -> Result<Comment, Error> {
	input.validate()?;

	let comment = sqlx::query_as::<_, Comment>(
		r#"
			INSERT INTO comment (text, post_id)
			SELECT ?, id FROM post WHERE id = ?
			RETURNING *
		"#,
	)
	.bind(input.text.trim())
	.bind(post_id)
	.fetch_optional(executor)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.is_foreign_key_violation() => {
			Error::UnknownPost(post_id)
		}
		e => Error::Database(e),
	})?
	.ok_or(Error::UnknownPost(post_id))?;

	tracing::info!(
		monotonic_counter.comments_added = 1_u64,
		post_id,
		comment_id = comment.id,
		"added comment"
	);

	Ok(comment)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{clock::test::FixedClock, store::test::user};

	fn post_input(title: &str, description: &str) -> CreatePost {
		CreatePost {
			title: title.into(),
			description: description.into(),
		}
	}

	fn comment_input(text: &str) -> CreateComment {
		CreateComment { text: text.into() }
	}

	async fn post(pool: &Database, author: &User, title: &str) -> Post {
		create_post(pool, &FixedClock::at(3, 5, 14, 7), author, &post_input(title, "body"))
			.await
			.unwrap()
	}

	#[test]
	fn test_like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("hello"), "%hello%");
		assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
	}

	#[sqlx::test]
	async fn test_create_post_denormalizes_author(pool: Database) {
		let alice = user(&pool, "a@x.com").await;
		let post = post(&pool, &alice, "T1").await;

		assert_eq!(post.author, alice.name);
		assert_eq!(post.avatar, alice.avatar);
		assert_eq!(post.upvotes, 0);
		assert_eq!(post.date, "14:07, 05 March");

		sqlx::query(r#"UPDATE "user" SET name = 'Renamed' WHERE id = ?"#)
			.bind(alice.id)
			.execute(&pool)
			.await
			.unwrap();

		assert_eq!(get_post(&pool, post.id).await.unwrap().author, alice.name);
	}

	#[sqlx::test]
	async fn test_create_post_rejects_blank_fields(pool: Database) {
		let alice = user(&pool, "a@x.com").await;
		let clock = FixedClock::at(3, 5, 14, 7);

		let result = create_post(&pool, &clock, &alice, &post_input(" ", "body")).await;
		assert!(matches!(result, Err(Error::Validation(..))));

		let result = create_post(&pool, &clock, &alice, &post_input("title", "\n\t")).await;
		assert!(matches!(result, Err(Error::Validation(..))));

		assert!(list_posts(&pool).await.unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_post_date_follows_clock(pool: Database) {
		let alice = user(&pool, "a@x.com").await;

		let first = create_post(
			&pool,
			&FixedClock::at(1, 2, 9, 30),
			&alice,
			&post_input("first", "body"),
		)
		.await
		.unwrap();
		let second = create_post(
			&pool,
			&FixedClock::at(12, 24, 23, 59),
			&alice,
			&post_input("second", "body"),
		)
		.await
		.unwrap();

		assert_eq!(first.date, "09:30, 02 January");
		assert_eq!(second.date, "23:59, 24 December");
	}

	#[sqlx::test]
	async fn test_search(pool: Database) {
		let alice = user(&pool, "a@x.com").await;

		post(&pool, &alice, "Hello World").await;
		post(&pool, &alice, "Rust tips").await;
		post(&pool, &alice, "100% done").await;

		let all = list_posts(&pool).await.unwrap();
		assert_eq!(all.len(), 3);

		let blank = search_posts(&pool, "   ").await.unwrap();
		assert_eq!(
			blank.iter().map(|p| p.id).collect::<Vec<_>>(),
			all.iter().map(|p| p.id).collect::<Vec<_>>()
		);
		assert_eq!(search_posts(&pool, "").await.unwrap().len(), 3);

		let hello = search_posts(&pool, "hello").await.unwrap();
		assert_eq!(hello.len(), 1);
		assert_eq!(hello[0].title, "Hello World");

		// every post matches its author
		assert_eq!(search_posts(&pool, &alice.name.to_uppercase()).await.unwrap().len(), 3);

		assert_eq!(search_posts(&pool, "%").await.unwrap().len(), 1);
		assert!(search_posts(&pool, "nothing like this").await.unwrap().is_empty());
	}

	#[sqlx::test]
	async fn test_upvote(pool: Database) {
		let alice = user(&pool, "a@x.com").await;
		let post = post(&pool, &alice, "T1").await;

		assert_eq!(upvote(&pool, post.id).await.unwrap(), 1);
		assert_eq!(upvote(&pool, post.id).await.unwrap(), 2);
		assert_eq!(get_post(&pool, post.id).await.unwrap().upvotes, 2);

		assert!(matches!(
			upvote(&pool, post.id + 1).await,
			Err(Error::UnknownPost(..))
		));
	}

	#[sqlx::test]
	async fn test_concurrent_upvotes_are_not_lost(pool: Database) {
		let alice = user(&pool, "a@x.com").await;

		for n in [1, 10, 100, 1000] {
			let post_id = post(&pool, &alice, "contended").await.id;

			let tasks = (0..n)
				.map(|_| {
					let pool = pool.clone();
					tokio::spawn(async move { upvote(&pool, post_id).await })
				})
				.collect::<Vec<_>>();

			for task in tasks {
				task.await.unwrap().unwrap();
			}

			assert_eq!(get_post(&pool, post_id).await.unwrap().upvotes, n);
		}
	}

	#[sqlx::test]
	async fn test_comments(pool: Database) {
		let alice = user(&pool, "a@x.com").await;
		let post = post(&pool, &alice, "T1").await;

		assert!(list_comments(&pool, post.id).await.unwrap().is_empty());

		let comment = add_comment(&pool, post.id, &comment_input("nice"))
			.await
			.unwrap();

		assert_eq!(comment.post_id, post.id);

		let comments = list_comments(&pool, post.id).await.unwrap();
		assert_eq!(comments.len(), 1);
		assert_eq!(comments[0].text, "nice");

		let result = add_comment(&pool, post.id, &comment_input("  ")).await;
		assert!(matches!(result, Err(Error::Validation(..))));
	}

	#[sqlx::test]
	async fn test_comment_on_missing_post(pool: Database) {
		let result = add_comment(&pool, 7, &comment_input("orphan")).await;

		assert!(matches!(result, Err(Error::UnknownPost(7))));
		assert!(matches!(
			list_comments(&pool, 7).await,
			Err(Error::UnknownPost(7))
		));

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}
}
