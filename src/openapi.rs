use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const BLOG: &str = "Blog";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Blog Open API")
		.summary("Page contexts for the blog")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::BLOG.into(),
			description: Some("Blog pages, ranked by popularity and recency".into()),
			..Default::default()
		})
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				errors: error::Message::new("unknown_post")
					.content("The post you requested does not exist.")
					.detail("slug", "hello-world")
					.into_vec(),
			})
		})
}
