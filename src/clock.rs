use chrono::{DateTime, Local};

/// The format of [`crate::model::Post::date`].
pub const POST_DATE_FORMAT: &str = "%H:%M, %d %B";

/// A source of the current time.
///
/// Read once per operation, so stored timestamps reflect when the
/// operation happened.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Local>;

	/// The current time formatted for display on a post.
	fn post_date(&self) -> String {
		self.now().format(POST_DATE_FORMAT).to_string()
	}
}

/// The server's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Local> {
		Local::now()
	}
}
