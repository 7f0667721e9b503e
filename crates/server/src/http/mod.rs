pub mod auth;
pub mod handlers;
pub mod response;
pub mod router;
