//! Key-management client for envelope encryption of secrets.
//!
//! [`KmsClient`] is the raw service primitive; [`encrypt`] is the checked
//! encryption call the resolution pipeline uses.

pub mod aws;
pub mod client;
pub mod config;
pub mod encryptor;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use aws::AwsKms;
pub use client::{EncryptResponse, KmsClient};
pub use config::KmsConfig;
pub use encryptor::{CiphertextBlob, encrypt};
pub use error::{KmsError, KmsResult};
#[cfg(any(test, feature = "testing"))]
pub use mock::{EncryptCall, MockBehavior, MockKms};
