use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    error::DisplayErrorContext, types::AuthFlowType, Client as CognitoClient,
};

use crate::{required_env, AppError, AppResult, CredentialVerifier};

/// Re-checks a user's primary account password against the user pool
pub struct CognitoService {
    client: CognitoClient,
    user_pool_id: String,
    client_id: String,
}

impl CognitoService {
    pub fn new(client: CognitoClient, user_pool_id: String, client_id: String) -> Self {
        Self {
            client,
            user_pool_id,
            client_id,
        }
    }

    /// Create CognitoService from USER_POOL_ID and USER_POOL_CLIENT_ID
    pub fn from_env(client: CognitoClient) -> AppResult<Self> {
        let user_pool_id = required_env("USER_POOL_ID")?;
        let client_id = required_env("USER_POOL_CLIENT_ID")?;

        tracing::info!("CognitoService initialized with user pool: {}", user_pool_id);
        Ok(Self::new(client, user_pool_id, client_id))
    }
}

#[async_trait]
impl CredentialVerifier for CognitoService {
    async fn verify_credentials(&self, username: &str, password: &str) -> AppResult<bool> {
        let result = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::AdminNoSrpAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await;

        match result {
            // A challenge (e.g. NEW_PASSWORD_REQUIRED) still proves the password
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_authorized_exception()
                    || service_error.is_user_not_found_exception()
                    || service_error.is_user_not_confirmed_exception()
                    || service_error.is_password_reset_required_exception()
                {
                    tracing::warn!("Account credentials rejected for user: {}", username);
                    Ok(false)
                } else {
                    tracing::error!(
                        "Cognito AdminInitiateAuth failed for user {}: {}",
                        username,
                        DisplayErrorContext(&service_error)
                    );
                    Err(AppError::CognitoError(service_error.to_string()))
                }
            }
        }
    }
}
