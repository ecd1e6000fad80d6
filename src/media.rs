use std::sync::Arc;

/// Resolves stored image references into urls the client can load.
#[derive(Debug, Clone)]
pub struct Media {
	base_url: Arc<str>,
}

impl Media {
	pub fn new(base_url: impl AsRef<str>) -> Self {
		let base_url = base_url.as_ref().trim_end_matches('/');

		Self {
			base_url: format!("{base_url}/").into(),
		}
	}

	/// Returns the public url of an image reference.
	///
	/// References that are already absolute urls are returned as-is.
	pub fn url(&self, image: &str) -> String {
		if image.starts_with("http://") || image.starts_with("https://") {
			return image.to_string();
		}

		format!("{}{}", self.base_url, image.trim_start_matches('/'))
	}
}
