//! Persistence for users, sessions, posts and comments.
//!
//! Every operation that reads and then writes runs as a single statement
//! (or a single transaction), so concurrent requests never lose updates.

pub mod content;
pub mod credential;
pub mod session;

#[cfg(test)]
pub mod test {
	use argon2::{Algorithm, Argon2, Params, Version};

	use super::credential;
	use crate::{model::RegisterInput, model::User, Database};

	/// An Argon2 hasher with the smallest parameters, to keep tests fast.
	pub fn hasher() -> Argon2<'static> {
		Argon2::new(
			Algorithm::Argon2id,
			Version::V0x13,
			Params::new(Params::MIN_M_COST, 1, 1, None).unwrap(),
		)
	}

	/// Registers a user named Alice with the given email.
	pub async fn user(pool: &Database, email: &str) -> User {
		let input = RegisterInput {
			email: email.into(),
			password: "p1".into(),
			name: "Alice".into(),
		};

		let registration = credential::Registration::new(&hasher(), &input).unwrap();

		credential::register(pool, registration).await.unwrap()
	}
}
