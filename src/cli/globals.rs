use anyhow::{anyhow, Context, Result};
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::cookie::Key;
use tracing::warn;

#[derive(Clone)]
pub struct GlobalArgs {
    pub session_secret: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(session_secret: Option<String>) -> Self {
        Self {
            session_secret: session_secret.map(SecretString::from),
        }
    }

    /// Derive the cookie signing key from the configured secret.
    ///
    /// Without a secret an ephemeral random key is generated; sessions
    /// signed with it do not survive a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is not valid base64 or decodes to
    /// fewer than 32 bytes
    pub fn signing_key(&self) -> Result<Key> {
        match &self.session_secret {
            Some(secret) => {
                let bytes = Base64::decode_vec(secret.expose_secret())
                    .map_err(|err| anyhow!("session secret is not valid base64: {err}"))?;

                if bytes.len() < 32 {
                    return Err(anyhow!(
                        "session secret must decode to at least 32 bytes, got {}",
                        bytes.len()
                    ));
                }

                Ok(Key::derive_from(&bytes))
            }
            None => {
                warn!("No session secret configured, sessions will not survive a restart");

                let mut bytes = [0u8; 64];
                OsRng
                    .try_fill_bytes(&mut bytes)
                    .context("failed to generate session key")?;

                Ok(Key::from(&bytes))
            }
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "***"),
            )
            .finish()
    }
}
