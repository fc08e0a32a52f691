use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// The id of a post, taken from the path.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// Matched against post titles and authors, ignoring case. Blank returns every post.
	#[serde(default)]
	pub query: Option<String>,
}

impl SearchInput {
	pub fn query(&self) -> &str {
		self.query.as_deref().unwrap_or_default()
	}
}
