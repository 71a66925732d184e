//! User HTTP surface.

mod dto;
mod handlers;
mod routes;

pub use dto::{ChangeUserStatusRequest, CreateUserRequest, UserResponse};
pub use handlers::UserAppState;
pub use routes::user_routes;
