use crate::AppError;

/// Default table used by the guestbook Lambdas
pub const GUESTBOOK_TABLE: &str = "guestbook-table";

/// Default table used by the notes Lambdas
pub const NOTES_TABLE: &str = "SecureNotesTable";

/// Configuration for resource naming at runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub app_name: String,
    pub environment: String,
}

impl RuntimeConfig {
    /// Create runtime config from the APP_NAME and ENVIRONMENT variables
    pub fn from_env() -> Result<Self, AppError> {
        let app_name = std::env::var("APP_NAME")
            .map_err(|_| AppError::ConfigurationError("APP_NAME not set".to_string()))?;

        let environment = std::env::var("ENVIRONMENT")
            .map_err(|_| AppError::ConfigurationError("ENVIRONMENT not set".to_string()))?;

        Ok(Self {
            app_name,
            environment,
        })
    }

    /// Create a resource name following the {APP_NAME}-{ENVIRONMENT}-{RESOURCE_NAME} pattern
    pub fn resource_name(&self, resource_name: &str) -> String {
        format!("{}-{}-{}", self.app_name, self.environment, resource_name)
    }

    /// Get DynamoDB table name
    pub fn dynamo_table(&self, table_name: &str) -> String {
        self.resource_name(table_name)
    }
}

/// Resolve the table a Lambda should use.
///
/// `TABLE_NAME` wins; otherwise the default is prefixed through
/// [`RuntimeConfig`] when APP_NAME and ENVIRONMENT are both present, and used
/// verbatim when they are not.
pub fn resolve_table_name(default_table: &str) -> String {
    resolve_table_name_from(std::env::var("TABLE_NAME").ok(), RuntimeConfig::from_env().ok(), default_table)
}

fn resolve_table_name_from(
    table_name: Option<String>,
    runtime_config: Option<RuntimeConfig>,
    default_table: &str,
) -> String {
    match (table_name, runtime_config) {
        (Some(name), _) if !name.trim().is_empty() => name,
        (_, Some(config)) => config.dynamo_table(default_table),
        _ => default_table.to_string(),
    }
}

/// Read a variable that must be present for the Lambda to start
pub fn required_env(name: &str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            tracing::error!("{} environment variable not set", name);
            Err(AppError::ConfigurationError(format!("{} not set", name)))
        }
    }
}
