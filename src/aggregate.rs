//! Grouped counts over the relations of posts and tags.
//!
//! Every function issues a single `GROUP BY` query for the whole batch
//! of ids. Ids without related rows are absent from the result and
//! are read as zero through [`count_of`].

use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

/// A count per entity id.
pub type Counts = HashMap<Uuid, i64>;

#[derive(sqlx::FromRow)]
struct Counted {
	id: Uuid,
	count: i64,
}

/// Returns the count for `id`, treating a missing entry as zero.
pub fn count_of(counts: &Counts, id: &Uuid) -> i64 {
	counts.get(id).copied().unwrap_or(0)
}

async fn grouped(conn: &mut PgConnection, sql: &str, ids: &[Uuid]) -> Result<Counts, sqlx::Error> {
	if ids.is_empty() {
		return Ok(Counts::new());
	}

	let rows = sqlx::query_as::<_, Counted>(sql)
		.bind(ids)
		.fetch_all(conn)
		.await?;

	Ok(rows.into_iter().map(|row| (row.id, row.count)).collect())
}

/// Counts the comments under each of the given posts.
pub async fn comments_count_by_post(
	conn: &mut PgConnection,
	post_ids: &[Uuid],
) -> Result<Counts, sqlx::Error> {
	grouped(
		conn,
		r#"
			SELECT post_id AS id, COUNT(*) AS count
			FROM comment
			WHERE post_id = ANY($1)
			GROUP BY post_id
		"#,
		post_ids,
	)
	.await
}

/// Counts the distinct users that liked each of the given posts.
pub async fn likes_count_by_post(
	conn: &mut PgConnection,
	post_ids: &[Uuid],
) -> Result<Counts, sqlx::Error> {
	grouped(
		conn,
		r#"
			SELECT post_id AS id, COUNT(DISTINCT user_id) AS count
			FROM post_like
			WHERE post_id = ANY($1)
			GROUP BY post_id
		"#,
		post_ids,
	)
	.await
}

/// Counts the distinct posts carrying each of the given tags.
pub async fn posts_count_by_tag(
	conn: &mut PgConnection,
	tag_ids: &[Uuid],
) -> Result<Counts, sqlx::Error> {
	grouped(
		conn,
		r#"
			SELECT tag_id AS id, COUNT(DISTINCT post_id) AS count
			FROM post_tag
			WHERE tag_id = ANY($1)
			GROUP BY tag_id
		"#,
		tag_ids,
	)
	.await
}
