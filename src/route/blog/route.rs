use std::time::Instant;

use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path},
	media::Media,
	openapi::tag,
	page, query, Database,
};

use super::{model, RouteError};

/// Records how long it took to assemble a page.
fn record_latency(page: &'static str, started: Instant) {
	let elapsed = started.elapsed().as_secs_f64() * 1000.0;

	tracing::info!(histogram.page_latency_ms = elapsed, page, "page assembled");
}

/// Index page
/// Returns the freshest posts, along with the most liked posts and the most used tags.
#[route(tag = tag::BLOG)]
pub async fn get_index(
	State(database): State<Database>,
	State(media): State<Media>,
) -> Result<Json<page::IndexPage>, RouteError> {
	let started = Instant::now();
	let mut tx = query::begin_read_only(&database).await?;

	let page = page::index(&mut tx, &media).await?;

	record_latency("index", started);
	Ok(Json(page))
}

/// Post page
/// Returns a single post by its slug, with its comments oldest first.
#[route(tag = tag::BLOG, response(status = 404, description = "No post has this slug."))]
pub async fn get_post(
	State(database): State<Database>,
	State(media): State<Media>,
	Path(path): Path<model::SlugInput>,
) -> Result<Json<page::PostDetailPage>, RouteError> {
	let started = Instant::now();
	let mut tx = query::begin_read_only(&database).await?;

	let page = page::post_detail(&mut tx, &path.slug, &media).await?;

	record_latency("post", started);
	Ok(Json(page))
}

/// Tag page
/// Returns the 20 most recent posts carrying a tag.
#[route(tag = tag::BLOG, response(status = 404, description = "No tag has this title."))]
pub async fn get_tag(
	State(database): State<Database>,
	State(media): State<Media>,
	Path(path): Path<model::TagInput>,
) -> Result<Json<page::TagFilterPage>, RouteError> {
	let started = Instant::now();
	let mut tx = query::begin_read_only(&database).await?;

	let page = page::tag_filter(&mut tx, &path.title, &media).await?;

	record_latency("tag", started);
	Ok(Json(page))
}

/// Year archive
/// Returns the posts published during a year, oldest first.
#[route(tag = tag::BLOG)]
pub async fn get_archive(
	State(database): State<Database>,
	State(media): State<Media>,
	Path(path): Path<model::YearInput>,
) -> Result<Json<page::ArchivePage>, RouteError> {
	let started = Instant::now();
	let mut tx = query::begin_read_only(&database).await?;

	let page = page::archive(&mut tx, path.year, &media).await?;

	record_latency("archive", started);
	Ok(Json(page))
}

/// Contacts page
/// Returns the contacts page, which has no dynamic content.
#[route(tag = tag::BLOG)]
pub async fn get_contacts() -> Json<page::ContactsPage> {
	Json(page::ContactsPage::default())
}
