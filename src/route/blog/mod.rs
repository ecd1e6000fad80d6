use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{
	error::{self, AppError},
	page, AppState,
};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<page::Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_index, get_index_docs))
		.api_route("/post/:slug", get_with(get_post, get_post_docs))
		.api_route("/tag/:title", get_with(get_tag, get_tag_docs))
		.api_route("/archive/:year", get_with(get_archive, get_archive_docs))
		.api_route("/contacts", get_with(get_contacts, get_contacts_docs))
}

impl From<page::Error> for RouteError {
	fn from(error: page::Error) -> Self {
		match error {
			page::Error::Database(error) => Self::App(AppError::Database(error)),
			error => Self::Route(error),
		}
	}
}

impl error::ErrorShape for page::Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownTag(..) => StatusCode::NOT_FOUND,
			Self::InvalidYear(..) => StatusCode::BAD_REQUEST,
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(slug) => error::Message::new("unknown_post")
				.content("The post you requested does not exist.")
				.detail("slug", slug),
			Self::UnknownTag(title) => error::Message::new("unknown_tag")
				.content("The tag you requested does not exist.")
				.detail("tag", title),
			Self::InvalidYear(year) => error::Message::new("invalid_year").detail("year", year),
			Self::Database(..) => error::Message::new("internal_error"),
		}
		.into_vec()
	}
}
