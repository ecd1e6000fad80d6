//! Assembles the context of every page from queries, counts and view models.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
	aggregate::{self, count_of, Counts},
	media::Media,
	model::{Post, Tag},
	query,
	view::{self, PostDetail, PostSummary, TagSummary},
};

/// Number of entries in each sidebar list.
pub const SIDEBAR_LIMIT: i64 = 5;
/// Number of fresh posts on the index page.
pub const FRESH_LIMIT: i64 = 5;
/// Number of posts on a tag page.
pub const TAG_LIMIT: i64 = 20;
/// Number of posts on a year archive page.
pub const ARCHIVE_LIMIT: i64 = 50;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("unknown tag {0}")]
	UnknownTag(String),
	#[error("invalid year {0}")]
	InvalidYear(i32),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

/// The lists shown next to every page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Sidebar {
	/// The most liked posts.
	pub most_popular_posts: Vec<PostSummary>,
	/// The tags carried by the most posts.
	pub popular_tags: Vec<TagSummary>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct IndexPage {
	/// The most recently published posts.
	pub page_posts: Vec<PostSummary>,
	#[serde(flatten)]
	pub sidebar: Sidebar,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetailPage {
	pub post: PostDetail,
	#[serde(flatten)]
	pub sidebar: Sidebar,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TagFilterPage {
	/// The title of the tag being filtered on.
	pub tag: String,
	/// The most recent posts carrying the tag.
	pub posts: Vec<PostSummary>,
	#[serde(flatten)]
	pub sidebar: Sidebar,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ArchivePage {
	pub year: i32,
	/// Posts published during the year, oldest first.
	pub posts: Vec<PostSummary>,
	#[serde(flatten)]
	pub sidebar: Sidebar,
}

/// The contacts page has no dynamic content yet.
#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct ContactsPage {}

/// The tags of a batch of posts, each with the number of posts carrying it.
struct PostTags {
	tags: HashMap<Uuid, Vec<Tag>>,
	tag_posts: Counts,
}

impl PostTags {
	async fn load(conn: &mut PgConnection, post_ids: &[Uuid]) -> Result<Self, sqlx::Error> {
		let tags = query::tags_by_post(conn, post_ids).await?;

		let mut tag_ids = tags.values().flatten().map(|tag| tag.id).collect::<Vec<_>>();
		tag_ids.sort_unstable();
		tag_ids.dedup();

		let tag_posts = aggregate::posts_count_by_tag(conn, &tag_ids).await?;

		Ok(Self { tags, tag_posts })
	}

	fn of(&self, post: &Post) -> Vec<TagSummary> {
		self.tags
			.get(&post.id)
			.map(|tags| {
				tags.iter()
					.map(|tag| view::to_tag_summary(tag, count_of(&self.tag_posts, &tag.id)))
					.collect()
			})
			.unwrap_or_default()
	}
}

/// Everything needed to summarize a batch of posts, loaded with a fixed
/// number of queries regardless of the batch size.
struct Related {
	comments: Counts,
	likes: Counts,
	tags: PostTags,
}

impl Related {
	async fn load(conn: &mut PgConnection, posts: &[Post]) -> Result<Self, sqlx::Error> {
		let post_ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();

		Ok(Self {
			comments: aggregate::comments_count_by_post(conn, &post_ids).await?,
			likes: aggregate::likes_count_by_post(conn, &post_ids).await?,
			tags: PostTags::load(conn, &post_ids).await?,
		})
	}

	fn summary(&self, post: &Post, media: &Media) -> PostSummary {
		view::to_post_summary(
			post,
			self.tags.of(post),
			count_of(&self.comments, &post.id),
			count_of(&self.likes, &post.id),
			media,
		)
	}
}

/// Summarizes a batch of posts, keeping their order.
pub async fn summarize(
	conn: &mut PgConnection,
	posts: &[Post],
	media: &Media,
) -> Result<Vec<PostSummary>, sqlx::Error> {
	let related = Related::load(conn, posts).await?;

	Ok(posts
		.iter()
		.map(|post| related.summary(post, media))
		.collect())
}

/// Loads the popular posts and popular tags shown on every page.
pub async fn sidebar(conn: &mut PgConnection, media: &Media) -> Result<Sidebar, sqlx::Error> {
	let posts = query::popular_posts(conn, SIDEBAR_LIMIT).await?;
	let most_popular_posts = summarize(conn, &posts, media).await?;

	let popular_tags = query::popular_tags(conn, SIDEBAR_LIMIT)
		.await?
		.into_iter()
		.map(|tag| {
			let (tag, count) = tag.split();
			view::to_tag_summary(&tag, count)
		})
		.collect();

	Ok(Sidebar {
		most_popular_posts,
		popular_tags,
	})
}

#[tracing::instrument(skip_all)]
pub async fn index(conn: &mut PgConnection, media: &Media) -> Result<IndexPage, Error> {
	let posts = query::fresh_posts(conn, FRESH_LIMIT).await?;
	let page_posts = summarize(conn, &posts, media).await?;

	Ok(IndexPage {
		page_posts,
		sidebar: sidebar(conn, media).await?,
	})
}

#[tracing::instrument(skip(conn, media))]
pub async fn post_detail(
	conn: &mut PgConnection,
	slug: &str,
	media: &Media,
) -> Result<PostDetailPage, Error> {
	let post = query::post_by_slug(conn, slug)
		.await?
		.ok_or_else(|| Error::UnknownPost(slug.to_string()))?;

	let post_ids = [post.id];
	let tags = PostTags::load(conn, &post_ids).await?;
	let likes = aggregate::likes_count_by_post(conn, &post_ids).await?;
	let comments = query::comments_for_post(conn, post.id).await?;

	let detail = view::to_post_detail(
		&post,
		tags.of(&post),
		&comments,
		count_of(&likes, &post.id),
		media,
	);

	Ok(PostDetailPage {
		post: detail,
		sidebar: sidebar(conn, media).await?,
	})
}

#[tracing::instrument(skip(conn, media))]
pub async fn tag_filter(
	conn: &mut PgConnection,
	title: &str,
	media: &Media,
) -> Result<TagFilterPage, Error> {
	let tag = query::tag_by_title(conn, title)
		.await?
		.ok_or_else(|| Error::UnknownTag(title.to_string()))?;

	let posts = query::posts_with_tag(conn, tag.id, TAG_LIMIT).await?;
	let posts = summarize(conn, &posts, media).await?;

	Ok(TagFilterPage {
		tag: tag.title,
		posts,
		sidebar: sidebar(conn, media).await?,
	})
}

#[tracing::instrument(skip(conn, media))]
pub async fn archive(conn: &mut PgConnection, year: i32, media: &Media) -> Result<ArchivePage, Error> {
	let start_of = |year| Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();

	let (Some(from), Some(to)) = (start_of(year), year.checked_add(1).and_then(start_of)) else {
		return Err(Error::InvalidYear(year));
	};

	let posts = query::posts_between(conn, from, to, ARCHIVE_LIMIT).await?;
	let posts = summarize(conn, &posts, media).await?;

	Ok(ArchivePage {
		year,
		posts,
		sidebar: sidebar(conn, media).await?,
	})
}
