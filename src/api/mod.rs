// HTTP API module.
// Router, handlers and the normalized error shape.

pub mod error;
pub mod routes;

pub use error::{ApiError, normalize};
pub use routes::router;
