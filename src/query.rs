//! Read-only queries that load rows for page assembly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, Transaction};
use uuid::Uuid;

use crate::{
	model::{Comment, CountedTag, Post, PostTag, Tag},
	Database,
};

/// Columns of [`Post`], for a query that aliases `post` as `p` and
/// `"user"` as `u`.
const POST_COLUMNS: &str = r#"
	p.id, p.title, p.text, p.slug, p.image, p.published_at,
	u.username AS author
"#;

/// Begins a read-only transaction so that every query of a page sees
/// the same snapshot.
///
/// The transaction is never committed. Dropping it rolls back and returns
/// the connection to the pool, including when a query fails midway.
pub async fn begin_read_only(
	database: &Database,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
	let mut tx = database.begin().await?;

	sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
		.execute(&mut *tx)
		.await?;

	Ok(tx)
}

/// Returns the most liked posts, breaking ties by recency.
pub async fn popular_posts(conn: &mut PgConnection, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
	let sql = format!(
		r#"
			SELECT {POST_COLUMNS}
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			LEFT JOIN post_like l ON l.post_id = p.id
			GROUP BY p.id, u.username
			ORDER BY COUNT(DISTINCT l.user_id) DESC, p.published_at DESC, p.id
			LIMIT $1
		"#
	);

	sqlx::query_as::<_, Post>(&sql)
		.bind(limit)
		.fetch_all(conn)
		.await
}

/// Returns the most recently published posts.
pub async fn fresh_posts(conn: &mut PgConnection, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
	let sql = format!(
		r#"
			SELECT {POST_COLUMNS}
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			ORDER BY p.published_at DESC, p.id
			LIMIT $1
		"#
	);

	sqlx::query_as::<_, Post>(&sql)
		.bind(limit)
		.fetch_all(conn)
		.await
}

/// Returns the post with the given slug.
///
/// Slugs are not unique, so the most recently published match wins.
pub async fn post_by_slug(conn: &mut PgConnection, slug: &str) -> Result<Option<Post>, sqlx::Error> {
	let sql = format!(
		r#"
			SELECT {POST_COLUMNS}
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			WHERE p.slug = $1
			ORDER BY p.published_at DESC, p.id
			LIMIT 1
		"#
	);

	sqlx::query_as::<_, Post>(&sql)
		.bind(slug)
		.fetch_optional(conn)
		.await
}

/// Returns the most recent posts carrying a tag.
pub async fn posts_with_tag(
	conn: &mut PgConnection,
	tag_id: Uuid,
	limit: i64,
) -> Result<Vec<Post>, sqlx::Error> {
	let sql = format!(
		r#"
			SELECT {POST_COLUMNS}
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			JOIN post_tag pt ON pt.post_id = p.id
			WHERE pt.tag_id = $1
			ORDER BY p.published_at DESC, p.id
			LIMIT $2
		"#
	);

	sqlx::query_as::<_, Post>(&sql)
		.bind(tag_id)
		.bind(limit)
		.fetch_all(conn)
		.await
}

/// Returns posts published in `[from, to)`, oldest first.
pub async fn posts_between(
	conn: &mut PgConnection,
	from: DateTime<Utc>,
	to: DateTime<Utc>,
	limit: i64,
) -> Result<Vec<Post>, sqlx::Error> {
	let sql = format!(
		r#"
			SELECT {POST_COLUMNS}
			FROM post p
			JOIN "user" u ON u.id = p.author_id
			WHERE p.published_at >= $1 AND p.published_at < $2
			ORDER BY p.published_at, p.id
			LIMIT $3
		"#
	);

	sqlx::query_as::<_, Post>(&sql)
		.bind(from)
		.bind(to)
		.bind(limit)
		.fetch_all(conn)
		.await
}

/// Returns the tag matching this title.
///
/// The title is trimmed and lowercased by the database, the same way the
/// `tag` table normalizes titles on write.
pub async fn tag_by_title(conn: &mut PgConnection, title: &str) -> Result<Option<Tag>, sqlx::Error> {
	sqlx::query_as::<_, Tag>("SELECT id, title FROM tag WHERE title = lower(trim($1))")
		.bind(title)
		.fetch_optional(conn)
		.await
}

/// Returns the tags carried by the most posts, breaking ties by title.
pub async fn popular_tags(
	conn: &mut PgConnection,
	limit: i64,
) -> Result<Vec<CountedTag>, sqlx::Error> {
	sqlx::query_as::<_, CountedTag>(
		r#"
			SELECT t.id, t.title, COUNT(DISTINCT pt.post_id) AS posts_count
			FROM tag t
			LEFT JOIN post_tag pt ON pt.tag_id = t.id
			GROUP BY t.id
			ORDER BY posts_count DESC, t.title
			LIMIT $1
		"#,
	)
	.bind(limit)
	.fetch_all(conn)
	.await
}

/// Loads the tags of every given post in one query, ordered by title.
///
/// Posts without tags are absent from the result.
pub async fn tags_by_post(
	conn: &mut PgConnection,
	post_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, sqlx::Error> {
	if post_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows = sqlx::query_as::<_, PostTag>(
		r#"
			SELECT pt.post_id, t.id, t.title
			FROM post_tag pt
			JOIN tag t ON t.id = pt.tag_id
			WHERE pt.post_id = ANY($1)
			ORDER BY t.title
		"#,
	)
	.bind(post_ids)
	.fetch_all(conn)
	.await?;

	let mut tags = HashMap::<Uuid, Vec<Tag>>::new();

	for row in rows {
		tags.entry(row.post_id).or_default().push(row.into());
	}

	Ok(tags)
}

/// Returns every comment under a post, oldest first.
pub async fn comments_for_post(
	conn: &mut PgConnection,
	post_id: Uuid,
) -> Result<Vec<Comment>, sqlx::Error> {
	sqlx::query_as::<_, Comment>(
		r#"
			SELECT c.text, c.published_at, u.username AS author
			FROM comment c
			JOIN "user" u ON u.id = c.author_id
			WHERE c.post_id = $1
			ORDER BY c.published_at, c.id
		"#,
	)
	.bind(post_id)
	.fetch_all(conn)
	.await
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test::*;

	#[sqlx::test]
	async fn test_post_by_slug_prefers_newest(pool: Database) {
		let author = seed::user(&pool, "author", true).await;
		seed::post(&pool, author, "hello", days_ago(10)).await;
		let newest = seed::post(&pool, author, "hello", days_ago(1)).await;

		let mut conn = pool.acquire().await.unwrap();
		let post = post_by_slug(&mut conn, "hello").await.unwrap().unwrap();

		assert_eq!(post.id, newest);
		assert_eq!(post.author, "author");
		assert!(post_by_slug(&mut conn, "missing").await.unwrap().is_none());
	}

	#[sqlx::test]
	async fn test_comments_are_oldest_first(pool: Database) {
		let author = seed::user(&pool, "author", true).await;
		let reader = seed::user(&pool, "reader", false).await;
		let post = seed::post(&pool, author, "post", days_ago(5)).await;

		seed::comment(&pool, post, reader, "second", days_ago(1)).await;
		seed::comment(&pool, post, author, "first", days_ago(2)).await;

		let mut conn = pool.acquire().await.unwrap();
		let comments = comments_for_post(&mut conn, post).await.unwrap();
		let texts = comments.iter().map(|c| c.text.as_str()).collect::<Vec<_>>();

		assert_eq!(texts, ["first", "second"]);
		assert_eq!(comments[1].author, "reader");
	}

	#[sqlx::test]
	async fn test_tags_by_post(pool: Database) {
		let author = seed::user(&pool, "author", true).await;
		let tagged = seed::post(&pool, author, "tagged", days_ago(1)).await;
		let bare = seed::post(&pool, author, "bare", days_ago(2)).await;

		for title in ["web", "django"] {
			let tag = seed::tag(&pool, title).await;
			seed::tag_post(&pool, tagged, tag).await;
		}

		let mut conn = pool.acquire().await.unwrap();
		let tags = tags_by_post(&mut conn, &[tagged, bare]).await.unwrap();
		let titles = tags[&tagged]
			.iter()
			.map(|tag| tag.title.as_str())
			.collect::<Vec<_>>();

		assert_eq!(titles, ["django", "web"]);
		assert!(!tags.contains_key(&bare));
	}

	#[sqlx::test]
	async fn test_tag_titles_are_stored_lowercase(pool: Database) {
		seed::tag(&pool, " Python ").await;

		let mut conn = pool.acquire().await.unwrap();

		for title in ["python", "Python", "  PYTHON"] {
			let tag = tag_by_title(&mut conn, title).await.unwrap().unwrap();
			assert_eq!(tag.title, "python");
		}

		assert!(tag_by_title(&mut conn, "pyth").await.unwrap().is_none());
	}

	#[sqlx::test]
	async fn test_tag_lookup_matches_non_ascii_titles(pool: Database) {
		let mut conn = pool.acquire().await.unwrap();

		for title in ["ΟΔΟΣ", "İstanbul", "Ёлка"] {
			let id = seed::tag(&pool, title).await;
			let tag = tag_by_title(&mut conn, title).await.unwrap().unwrap();

			assert_eq!(tag.id, id);
		}
	}

	#[sqlx::test]
	async fn test_read_only_transaction_rejects_writes(pool: Database) {
		let mut tx = begin_read_only(&pool).await.unwrap();

		let result = sqlx::query("INSERT INTO tag (title) VALUES ('nope')")
			.execute(&mut *tx)
			.await;

		assert!(result.is_err());
	}
}
