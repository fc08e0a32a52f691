use macros::model;
use rand::{
	distributions::{Distribution, Standard},
	Rng,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(ValidationError::new("blank"));
	}

	Ok(())
}

/// The avatar shown next to a user's name.
///
/// Assigned randomly at registration and never changed afterwards.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Avatar {
	#[default]
	Fox,
	Owl,
	Otter,
}

impl Avatar {
	pub const ALL: [Self; 3] = [Self::Fox, Self::Owl, Self::Otter];
}

impl Distribution<Avatar> for Standard {
	fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Avatar {
		Avatar::ALL[rng.gen_range(0..Avatar::ALL.len())]
	}
}

/// A registered user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: i64,
	/// The email used for logging in, matched exactly.
	#[serde(skip_serializing)]
	pub email: String,
	/// The PHC string of the salted password hash.
	#[serde(skip)]
	pub password: String,
	/// The name that is displayed to the public.
	pub name: String,
	pub avatar: Avatar,
}

/// A login session, identified by the value of the session cookie.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	pub user_id: i64,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A post, created by a user.
///
/// `author` and `avatar` are copied from the user when the post is
/// created and are not kept in sync afterwards.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The title of the post.
	#[validate(length(min = 1, max = 250), custom(function = "not_blank"))]
	pub title: String,
	/// The body of the post.
	#[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
	pub description: String,
	/// The local creation time, formatted like `14:07, 05 March`.
	#[serde(skip_deserializing)]
	pub date: String,
	/// The name of the author at the time of posting.
	#[serde(skip_deserializing)]
	pub author: String,
	/// The avatar of the author at the time of posting.
	#[serde(skip_deserializing)]
	pub avatar: Avatar,
	/// The number of upvotes.
	#[serde(skip_deserializing)]
	pub upvotes: i64,
}

/// An anonymous comment on a post.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The post this comment belongs to.
	#[serde(skip_deserializing)]
	pub post_id: i64,
	/// The body of the comment.
	#[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
	pub text: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(email, length(max = 100))]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
	/// The name that is displayed to the public.
	#[validate(length(min = 1, max = 1000), custom(function = "not_blank"))]
	pub name: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 100))]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_blank_title_is_rejected() {
		let input = CreatePost {
			title: "   ".into(),
			description: "body".into(),
		};

		let errors = input.validate().unwrap_err();

		assert!(errors.field_errors().contains_key("title"));
	}

	#[test]
	fn test_long_description_is_rejected() {
		let input = CreatePost {
			title: "title".into(),
			description: "a".repeat(501),
		};

		assert!(input.validate().is_err());
	}

	#[test]
	fn test_register_requires_email() {
		let input = RegisterInput {
			email: "not an email".into(),
			password: "p1".into(),
			name: "Alice".into(),
		};

		assert!(input.validate().is_err());
	}

	#[test]
	fn test_random_avatar_is_in_set() {
		for _ in 0..32 {
			let avatar: Avatar = rand::random();

			assert!(Avatar::ALL.contains(&avatar));
		}
	}

	#[test]
	fn test_avatar_serializes_snake_case() {
		assert_eq!(
			serde_json::to_value(Avatar::Otter).unwrap(),
			serde_json::json!("otter")
		);
	}
}
