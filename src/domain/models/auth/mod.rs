pub mod authenticated_user;
pub mod identity_claims;

pub use authenticated_user::{AuthenticatedUser, OptionalUser};
pub use identity_claims::IdentityClaims;
