mod handlers;
pub mod response;
mod routes;
pub mod scope;

pub use routes::create_router;
