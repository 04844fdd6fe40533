//! User accounts, passwords and bearer token authentication.

mod actor;
mod log_in;
mod password;
mod register_user;
mod token;
mod user;

pub use actor::Actor;
pub use log_in::log_in;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{AuthResponse, Credentials, register_user};
pub use token::{IdentityResolver, SharedResolver, TokenKeys};
pub use user::{User, UserID, count_users, create_user, create_user_table, get_user_by_email};
