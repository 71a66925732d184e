//! Command handlers for the user domain.

mod change_user_status;
mod create_user;

pub use change_user_status::{ChangeUserStatusCommand, ChangeUserStatusHandler};
pub use create_user::{CreateUserCommand, CreateUserHandler};
