use aide::axum::ApiRouter;

use crate::AppState;

pub mod blog;
pub mod docs;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().merge(blog::routes())
}
