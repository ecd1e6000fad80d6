//! Flat view models handed to the renderer.
//!
//! Everything in here is pure: the store has already been queried and
//! the counts aggregated, so building a view model cannot fail.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
	media::Media,
	model::{Comment, Post, Tag},
};

/// Number of characters of the body shown in list views.
pub const TEASER_LENGTH: usize = 200;

/// A post as shown in lists.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PostSummary {
	pub title: String,
	/// The first [`TEASER_LENGTH`] characters of the body.
	pub teaser_text: String,
	/// The author's username.
	pub author: String,
	pub comments_amount: i64,
	pub likes_amount: i64,
	pub image_url: Option<String>,
	pub published_at: DateTime<Utc>,
	pub slug: String,
	/// Ordered by title.
	pub tags: Vec<TagSummary>,
	/// The alphabetically first tag, or `null` for an untagged post.
	pub first_tag_title: Option<String>,
}

/// A tag and how many posts carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TagSummary {
	pub title: String,
	pub posts_with_tag: i64,
}

/// A comment under a post.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CommentView {
	pub text: String,
	pub published_at: DateTime<Utc>,
	/// The commenter's username.
	pub author: String,
}

/// A post with its full body and comments.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PostDetail {
	pub title: String,
	pub text: String,
	pub author: String,
	/// Oldest first.
	pub comments: Vec<CommentView>,
	pub likes_amount: i64,
	pub image_url: Option<String>,
	pub published_at: DateTime<Utc>,
	pub slug: String,
	pub tags: Vec<TagSummary>,
}

/// Returns the first [`TEASER_LENGTH`] characters of a post body.
pub fn teaser(text: &str) -> String {
	text.chars().take(TEASER_LENGTH).collect()
}

pub fn to_tag_summary(tag: &Tag, posts_count: i64) -> TagSummary {
	TagSummary {
		title: tag.title.clone(),
		posts_with_tag: posts_count,
	}
}

/// Resolves the image of a post, treating an empty reference as no image.
fn image_url(post: &Post, media: &Media) -> Option<String> {
	post.image
		.as_deref()
		.filter(|image| !image.is_empty())
		.map(|image| media.url(image))
}

fn sorted(mut tags: Vec<TagSummary>) -> Vec<TagSummary> {
	tags.sort_by(|a, b| a.title.cmp(&b.title));
	tags
}

pub fn to_post_summary(
	post: &Post,
	tags: Vec<TagSummary>,
	comments_count: i64,
	likes_count: i64,
	media: &Media,
) -> PostSummary {
	let tags = sorted(tags);

	PostSummary {
		title: post.title.clone(),
		teaser_text: teaser(&post.text),
		author: post.author.clone(),
		comments_amount: comments_count,
		likes_amount: likes_count,
		image_url: image_url(post, media),
		published_at: post.published_at,
		slug: post.slug.clone(),
		first_tag_title: tags.first().map(|tag| tag.title.clone()),
		tags,
	}
}

pub fn to_comment_view(comment: &Comment) -> CommentView {
	CommentView {
		text: comment.text.clone(),
		published_at: comment.published_at,
		author: comment.author.clone(),
	}
}

pub fn to_post_detail(
	post: &Post,
	tags: Vec<TagSummary>,
	comments: &[Comment],
	likes_count: i64,
	media: &Media,
) -> PostDetail {
	PostDetail {
		title: post.title.clone(),
		text: post.text.clone(),
		author: post.author.clone(),
		comments: comments.iter().map(to_comment_view).collect(),
		likes_amount: likes_count,
		image_url: image_url(post, media),
		published_at: post.published_at,
		slug: post.slug.clone(),
		tags: sorted(tags),
	}
}

#[cfg(test)]
mod test {
	use chrono::TimeZone;
	use uuid::Uuid;

	use super::*;

	fn post(text: &str, image: Option<&str>) -> Post {
		Post {
			id: Uuid::new_v4(),
			title: "Hello".into(),
			text: text.into(),
			slug: "hello".into(),
			image: image.map(Into::into),
			published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
			author: "alice".into(),
		}
	}

	fn tag(title: &str, posts: i64) -> TagSummary {
		TagSummary {
			title: title.into(),
			posts_with_tag: posts,
		}
	}

	#[test]
	fn test_summary_without_tags() {
		let summary = to_post_summary(&post("body", None), Vec::new(), 0, 0, &Media::new("/media/"));

		assert!(summary.tags.is_empty());
		assert_eq!(summary.first_tag_title, None);
		assert_eq!(summary.image_url, None);
		assert_eq!(summary.comments_amount, 0);
		assert_eq!(summary.likes_amount, 0);
	}

	#[test]
	fn test_summary_counts() {
		let summary = to_post_summary(&post("body", None), Vec::new(), 3, 2, &Media::new("/media/"));

		assert_eq!(summary.comments_amount, 3);
		assert_eq!(summary.likes_amount, 2);
		assert_eq!(summary.author, "alice");
	}

	#[test]
	fn test_summary_first_tag_is_alphabetical() {
		let tags = vec![tag("web", 1), tag("django", 4)];
		let summary = to_post_summary(&post("body", None), tags, 0, 0, &Media::new("/media/"));

		assert_eq!(summary.first_tag_title.as_deref(), Some("django"));
		assert_eq!(summary.tags, [tag("django", 4), tag("web", 1)]);
	}

	#[test]
	fn test_summary_image_url() {
		let summary = to_post_summary(
			&post("body", Some("cat.png")),
			Vec::new(),
			0,
			0,
			&Media::new("/media/"),
		);

		assert_eq!(summary.image_url.as_deref(), Some("/media/cat.png"));
	}

	#[test]
	fn test_empty_image_has_no_url() {
		let media = Media::new("/media/");
		let post = post("body", Some(""));

		let summary = to_post_summary(&post, Vec::new(), 0, 0, &media);
		let detail = to_post_detail(&post, Vec::new(), &[], 0, &media);

		assert_eq!(summary.image_url, None);
		assert_eq!(detail.image_url, None);
	}

	#[test]
	fn test_teaser_counts_characters() {
		let text = "ж".repeat(TEASER_LENGTH + 50);
		let teaser = teaser(&text);

		assert_eq!(teaser.chars().count(), TEASER_LENGTH);
		assert_eq!(super::teaser("short"), "short");
	}

	#[test]
	fn test_summary_serialized_shape() {
		let summary = to_post_summary(&post("body", None), Vec::new(), 1, 1, &Media::new("/media/"));
		let value = serde_json::to_value(&summary).unwrap();

		assert!(value["image_url"].is_null());
		assert!(value["first_tag_title"].is_null());
		assert_eq!(value["tags"], serde_json::json!([]));
		assert_eq!(value["teaser_text"], "body");
	}

	#[test]
	fn test_post_detail() {
		let comment = Comment {
			text: "nice".into(),
			published_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
			author: "bob".into(),
		};
		let detail = to_post_detail(
			&post(&"x".repeat(500), None),
			vec![tag("web", 1)],
			&[comment],
			7,
			&Media::new("/media/"),
		);

		assert_eq!(detail.text.len(), 500);
		assert_eq!(detail.likes_amount, 7);
		assert_eq!(detail.comments.len(), 1);
		assert_eq!(detail.comments[0].author, "bob");
		assert_eq!(detail.tags, [tag("web", 1)]);
	}

	#[test]
	fn test_tag_summary() {
		let tag = Tag {
			id: Uuid::new_v4(),
			title: "rust".into(),
		};

		assert_eq!(to_tag_summary(&tag, 3), super::TagSummary {
			title: "rust".into(),
			posts_with_tag: 3,
		});
	}
}
