pub mod assistant;
pub mod chat;
pub mod handlers;
pub mod mentions;
pub mod middleware;
pub mod routes;
pub mod scores;

pub use routes::create_router;
