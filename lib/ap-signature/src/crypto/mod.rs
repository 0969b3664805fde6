//!
//! Common cryptographic operations
//!

mod sign;
mod verify;

pub mod parse;

pub use self::parse::{PrivateKey, PublicKey};
pub use self::sign::sign;
pub use self::verify::{verify, VerifyError};
