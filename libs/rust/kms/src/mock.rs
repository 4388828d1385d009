//! In-memory KMS for tests.

use crate::client::{EncryptResponse, KmsClient};
use crate::error::{KmsError, KmsResult};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How [`MockKms`] answers encrypt calls.
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Ciphertext is `encrypted:` followed by the plaintext
    #[default]
    Prefix,
    /// Response without a ciphertext blob
    NoCiphertext,
    /// Response with an empty ciphertext blob
    EmptyCiphertext,
    /// The request fails with the given message
    Fail(String),
}

/// A recorded encrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptCall {
    /// Key id the caller asked for
    pub key_id: String,
    /// Plaintext as received
    pub plaintext: Vec<u8>,
}

/// In-memory KMS recording every call it receives.
#[derive(Debug, Default)]
pub struct MockKms {
    behavior: MockBehavior,
    calls: Mutex<Vec<EncryptCall>>,
}

impl MockKms {
    /// Mock using [`MockBehavior::Prefix`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with `behavior` instead.
    #[must_use]
    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<EncryptCall> {
        self.lock().clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EncryptCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KmsClient for MockKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptResponse> {
        self.lock().push(EncryptCall {
            key_id: key_id.to_string(),
            plaintext: plaintext.to_vec(),
        });

        match &self.behavior {
            MockBehavior::Prefix => {
                let mut blob = b"encrypted:".to_vec();
                blob.extend_from_slice(plaintext);
                Ok(EncryptResponse::with_blob(blob))
            }
            MockBehavior::NoCiphertext => Ok(EncryptResponse::default()),
            MockBehavior::EmptyCiphertext => Ok(EncryptResponse::with_blob(Vec::new())),
            MockBehavior::Fail(msg) => Err(KmsError::service(msg.clone())),
        }
    }
}
