pub mod guard;
pub mod password;
pub mod token;

pub use guard::{require_owner, require_participant, require_recipient};
pub use password::CredentialStore;
pub use token::TokenService;
