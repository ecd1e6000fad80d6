//! Rows read from the store.
//!
//! These are plain data: nothing here holds a connection or loads
//! related rows lazily. Related data is fetched in batches by
//! [`crate::query`] and [`crate::aggregate`].

use uuid::Uuid;

/// A single post, with its author's username already joined in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
	pub id: Uuid,
	pub title: String,
	pub text: String,
	/// Used in urls. Not unique in the schema.
	pub slug: String,
	/// A reference resolved by [`crate::media::Media`], if the post has an image.
	pub image: Option<String>,
	pub published_at: chrono::DateTime<chrono::Utc>,
	/// The author's username.
	pub author: String,
}

/// A tag that can be attached to many posts.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
	pub id: Uuid,
	/// Trimmed and lowercased by the store on write.
	pub title: String,
}

/// A tag attached to a post, as returned by a batched tag lookup.
#[derive(Debug, sqlx::FromRow)]
pub struct PostTag {
	pub post_id: Uuid,
	pub id: Uuid,
	pub title: String,
}

impl From<PostTag> for Tag {
	fn from(row: PostTag) -> Self {
		Self {
			id: row.id,
			title: row.title,
		}
	}
}

/// A comment under a post, with its author's username joined in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
	pub text: String,
	pub published_at: chrono::DateTime<chrono::Utc>,
	pub author: String,
}

/// A tag along with the number of distinct posts carrying it.
#[derive(Debug, sqlx::FromRow)]
pub struct CountedTag {
	pub id: Uuid,
	pub title: String,
	pub posts_count: i64,
}

impl CountedTag {
	pub fn split(self) -> (Tag, i64) {
		(
			Tag {
				id: self.id,
				title: self.title,
			},
			self.posts_count,
		)
	}
}
