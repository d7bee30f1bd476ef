//! Consumer credentials, token models, and the redacting secret wrapper.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::*;
