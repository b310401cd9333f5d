use chrono::Duration;

use crate::{hash_password, verify_password, AppError, AppResult, Clock, CredentialVerifier, LockStore};

/// Length of the window opened by a successful account re-verification
pub const VERIFICATION_WINDOW_MINUTES: i64 = 5;

/// Secondary password gate in front of a user's locked notes.
///
/// Per user the gate moves between three states:
///
/// - no lock password stored: the first `set_lock_password` needs no
///   verification;
/// - locked: a hash is stored and no unexpired window is open, so changing it
///   is refused;
/// - verified: `verify_account` succeeded less than
///   [`VERIFICATION_WINDOW_MINUTES`] ago. One password change is allowed,
///   which closes the window again.
///
/// Windows expire lazily: the stored flag is ignored once `verified_until`
/// has passed.
pub struct LockedSectionService<S, V, C> {
    store: S,
    verifier: V,
    clock: C,
}

impl<S: LockStore, V: CredentialVerifier, C: Clock> LockedSectionService<S, V, C> {
    pub fn new(store: S, verifier: V, clock: C) -> Self {
        Self {
            store,
            verifier,
            clock,
        }
    }

    /// Whether the caller has a lock password
    pub async fn get_status(&self, user_id: &str) -> AppResult<bool> {
        let record = self.store.get_lock(user_id).await?;
        Ok(record.map_or(false, |r| r.has_password()))
    }

    /// Re-check the caller's account password and, on success, open a
    /// verification window. Returns `false` without touching the store when
    /// the identity provider rejects the password.
    pub async fn verify_account(
        &self,
        user_id: &str,
        username: &str,
        account_password: &str,
    ) -> AppResult<bool> {
        if !self
            .verifier
            .verify_credentials(username, account_password)
            .await?
        {
            tracing::warn!("Account verification failed for user {}", user_id);
            return Ok(false);
        }

        let until = self.clock.now() + Duration::minutes(VERIFICATION_WINDOW_MINUTES);
        self.store.open_verification_window(user_id, until).await?;

        tracing::info!("Verification window open for user {} until {}", user_id, until);
        Ok(true)
    }

    pub async fn set_lock_password(&self, user_id: &str, password: &str) -> AppResult<()> {
        let now = self.clock.now();
        let record = self.store.get_lock(user_id).await?;

        match record {
            Some(record) if record.has_password() => {
                if !record.is_verified_at(now) {
                    tracing::warn!("Lock password change refused for user {}: not verified", user_id);
                    return Err(AppError::AccountVerificationRequired);
                }

                self.store
                    .set_password_hash(user_id, &hash_password(password), now, true)
                    .await?;
                tracing::info!("Lock password changed for user {}", user_id);
            }
            _ => {
                self.store
                    .set_password_hash(user_id, &hash_password(password), now, false)
                    .await?;
                tracing::info!("Lock password set for user {}", user_id);
            }
        }

        Ok(())
    }

    /// Check `password` against the stored lock password. Never opens or
    /// consumes a verification window.
    pub async fn verify_lock_password(&self, user_id: &str, password: &str) -> AppResult<bool> {
        let stored_hash = self
            .store
            .get_lock(user_id)
            .await?
            .and_then(|record| record.locked_password_hash)
            .ok_or(AppError::PasswordNotSet)?;

        let matches = verify_password(password, &stored_hash);
        if !matches {
            tracing::warn!("Lock password mismatch for user {}", user_id);
        }
        Ok(matches)
    }
}
