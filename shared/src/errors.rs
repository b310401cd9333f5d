use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing or incomplete authorizer claims")]
    Unauthenticated,

    #[error("Account verification required")]
    AccountVerificationRequired,

    #[error("Password not set")]
    PasswordNotSet,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("DynamoDB error: {0}")]
    DynamoDBError(String),

    #[error("Cognito error: {0}")]
    CognitoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// HTTP status code reported to the caller for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::ValidationError(_) | AppError::InvalidJson(_) => 400,
            AppError::Unauthenticated => 401,
            AppError::AccountVerificationRequired | AppError::PasswordNotSet => 403,
            AppError::NoteNotFound(_) => 404,
            AppError::MethodNotAllowed(_) => 405,
            AppError::DynamoDBError(_)
            | AppError::CognitoError(_)
            | AppError::SerializationError(_)
            | AppError::ConfigurationError(_)
            | AppError::InternalError(_) => 500,
        }
    }

    /// Message placed in the `error` field of the response body. Server-side
    /// failures are reported opaquely.
    pub fn client_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::InvalidJson(_) => "Invalid JSON".to_string(),
            AppError::Unauthenticated => "Unauthorized".to_string(),
            AppError::AccountVerificationRequired => "Account verification required".to_string(),
            AppError::PasswordNotSet => "Password not set".to_string(),
            AppError::NoteNotFound(_) => "Note not found".to_string(),
            AppError::MethodNotAllowed(_) => "Method not allowed".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
