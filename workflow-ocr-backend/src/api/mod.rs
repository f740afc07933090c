mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
mod routes;
mod state;

pub use extractors::OcrUpload;
pub use routes::create_router;
pub use state::AppState;
