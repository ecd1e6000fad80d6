use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SlugInput {
	/// The url slug of the post.
	#[validate(length(min = 1, max = 200))]
	pub slug: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct TagInput {
	/// The tag title, matched case-insensitively.
	#[validate(length(min = 1, max = 20))]
	pub title: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct YearInput {
	#[validate(range(min = 1, max = 9999))]
	pub year: i32,
}
