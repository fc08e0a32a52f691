#![warn(clippy::pedantic)]

mod clock;
mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod route;
mod session;
mod store;
mod trace;

use std::{str::FromStr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::Request, Extension, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use clock::{Clock, SystemClock};
use config::Config;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, a hash configuration (if it's expensive to create),
/// or the clock used to date new content.
///
/// For dependencies only used by a single handler, you can combine states instead.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub clock: Arc<dyn Clock>,
}

/// Builds the application router, including the `OpenAPI` documentation.
pub fn app(state: State) -> Router {
	aide::gen::on_error(|error| tracing::error!(%error, "openapi generation error"));
	aide::gen::extract_schemas(true);

	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest_api_service("/auth", route::auth::routes().with_state(state.clone()))
		.nest_api_service(
			"/posts",
			route::post::routes()
				.merge(route::comment::routes())
				.with_state(state),
		)
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(
					TraceLayer::new_for_http().make_span_with(|request: &Request| {
						let request_id = request
							.headers()
							.get("x-request-id")
							.and_then(|value| value.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id
						)
					}),
				)
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
}

#[tokio::main]
async fn main() {
	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(&config).expect("failed to initialize tracing");

	let options = SqliteConnectOptions::from_str(&config.database_url)
		.expect("DATABASE_URL must be a sqlite url")
		.create_if_missing(true)
		.journal_mode(SqliteJournalMode::Wal);

	let database = SqlitePoolOptions::new()
		.max_connections(config.database_max_connections)
		.connect_with(options)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State {
		database,
		hasher: Argon2::default(),
		clock: Arc::new(SystemClock),
	};

	let listener = tokio::net::TcpListener::bind((config.host, config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!(host = %config.host, port = config.port, "listening");

	axum::serve(listener, app(state)).await.unwrap();
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use axum_test::TestServerConfig;

	pub use axum_test::TestServer;
	pub use serde_json::json;

	pub use crate::Database;
	use crate::{clock::test::FixedClock, store::test::hasher};

	/// Creates a test server that keeps cookies between requests.
	///
	/// Posts are dated `14:07, 05 March`.
	pub fn app(database: Database) -> TestServer {
		let state = crate::State {
			database,
			hasher: hasher(),
			clock: Arc::new(FixedClock::at(3, 5, 14, 7)),
		};

		let config = TestServerConfig {
			save_cookies: true,
			..TestServerConfig::default()
		};

		TestServer::new_with_config(crate::app(state), config).unwrap()
	}
}
