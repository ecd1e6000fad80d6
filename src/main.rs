#![warn(clippy::pedantic)]

mod aggregate;
mod config;
mod error;
mod extract;
mod media;
mod model;
mod openapi;
mod page;
mod query;
mod ratelimit;
mod route;
mod trace;
mod view;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{config::Config, media::Media};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers extract the parts they need through [`axum::extract::FromRef`].
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub media: Media,
}

/// Builds the application router, including the API documentation.
pub fn router(state: State) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.merge(route::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
	}
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard =
		trace::init_tracing_subscriber(&config.trace).expect("failed to initialize tracing");

	tracing::debug!(?config, "loaded configuration");

	let database = PgPoolOptions::new()
		.max_connections(config.database.max_connections)
		.acquire_timeout(config.database.acquire_timeout)
		.connect(&config.database.url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State {
		database,
		media: Media::new(&config.media_url),
	};

	let governor = ratelimit::public();
	ratelimit::cleanup_old_limits(&[&governor]);

	let app = router(state).layer(GovernorLayer { config: governor });

	let listener = tokio::net::TcpListener::bind((config.server.host, config.server.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on {}:{}", config.server.host, config.server.port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await
	.expect("server error");
}
