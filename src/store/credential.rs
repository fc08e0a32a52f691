use argon2::{
	password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use rand::rngs::OsRng;
use sqlx::SqliteExecutor;
use validator::Validate;

use crate::model::{Avatar, RegisterInput, User};

/// An error that can occur while registering or authenticating a user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("email already taken")]
	EmailTaken,
	#[error("unknown email")]
	UnknownEmail,
	#[error("bad credential")]
	BadCredential,
	#[error("unknown user {0}")]
	UnknownUser(i64),
	#[error("password hash error: {0}")]
	Hash(password_hash::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

/// Hashes and verifies passwords.
///
/// Implementations must salt every hash and encode the salt and
/// parameters into the returned string.
pub trait Hasher: Send + Sync {
	fn hash(&self, password: &str) -> Result<String, password_hash::Error>;

	/// Returns `Ok(false)` when the password does not match the hash.
	fn verify(&self, password: &str, hash: &str) -> Result<bool, password_hash::Error>;
}

impl Hasher for Argon2<'_> {
	fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
		let salt = SaltString::generate(&mut OsRng);

		Ok(self.hash_password(password.as_bytes(), &salt)?.to_string())
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool, password_hash::Error> {
		let parsed = PasswordHash::new(hash)?;

		// the hash output is compared in constant time
		match self.verify_password(password.as_bytes(), &parsed) {
			Ok(()) => Ok(true),
			Err(password_hash::Error::Password) => Ok(false),
			Err(e) => Err(e),
		}
	}
}

/// A validated registration whose password is already hashed.
///
/// Building one runs the slow password hash, so it is done before any
/// connection or transaction is acquired.
pub struct Registration<'a> {
	input: &'a RegisterInput,
	password: String,
	avatar: Avatar,
}

impl<'a> Registration<'a> {
	pub fn new(hasher: &impl Hasher, input: &'a RegisterInput) -> Result<Self, Error> {
		input.validate()?;

		Ok(Self {
			input,
			password: hasher.hash(&input.password).map_err(Error::Hash)?,
			avatar: rand::random(),
		})
	}
}

/// Registers a new user with a random avatar.
///
/// The unique constraint on `email` decides between concurrent
/// registrations of the same address.
pub async fn register(
	executor: impl SqliteExecutor<'_>,
	registration: Registration<'_>,
) -> Result<User, Error> {
	let user = sqlx::query_as::<_, User>(
		r#"
			INSERT INTO "user" (email, password, name, avatar) VALUES (?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(&registration.input.email)
	.bind(registration.password)
	.bind(registration.input.name.trim())
	.bind(registration.avatar)
	.fetch_one(executor)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.is_unique_violation() => Error::EmailTaken,
		e => Error::Database(e),
	})?;

	tracing::info!(
		monotonic_counter.users_registered = 1_u64,
		user_id = user.id,
		"registered user"
	);

	Ok(user)
}

/// Returns the user with the email if the password matches.
pub async fn verify(
	executor: impl SqliteExecutor<'_>,
	hasher: &impl Hasher,
	email: &str,
	password: &str,
) -> Result<User, Error> {
	let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE email = ?"#)
		.bind(email)
		.fetch_optional(executor)
		.await?
		.ok_or(Error::UnknownEmail)?;

	if !hasher.verify(password, &user.password).map_err(Error::Hash)? {
		tracing::debug!(user_id = user.id, "password mismatch");
		return Err(Error::BadCredential);
	}

	Ok(user)
}

pub async fn load_by_id(executor: impl SqliteExecutor<'_>, user_id: i64) -> Result<User, Error> {
	sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = ?"#)
		.bind(user_id)
		.fetch_optional(executor)
		.await?
		.ok_or(Error::UnknownUser(user_id))
}
