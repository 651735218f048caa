pub mod handlers;
pub mod magnet;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod sessions;

pub use routes::create_router;
