use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::http::Method;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::json;
use tracing::{error, info};

use serverless_shared::{
    init_tracing, into_response, json_response, AppError, AppResult, Clock, CognitoService,
    CredentialVerifier, DynamoDBService, LockStatus, LockStore, LockedSectionRequest,
    LockedSectionService, ProxyRequestExt, SystemClock,
};

async fn function_handler<S: LockStore, V: CredentialVerifier, C: Clock>(
    service: &LockedSectionService<S, V, C>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (event, _context) = event.into_parts();

    info!("Received locked-section {} request", event.http_method);

    Ok(into_response(handle_request(service, &event).await))
}

async fn handle_request<S: LockStore, V: CredentialVerifier, C: Clock>(
    service: &LockedSectionService<S, V, C>,
    event: &ApiGatewayProxyRequest,
) -> AppResult<ApiGatewayProxyResponse> {
    if event.http_method != Method::GET && event.http_method != Method::POST {
        return Err(AppError::MethodNotAllowed(event.http_method.to_string()));
    }
    let user_id = event.user_id()?;

    if event.http_method == Method::GET {
        let has_password = service.get_status(&user_id).await?;
        return json_response(200, &LockStatus { has_password });
    }

    let request: LockedSectionRequest = event.json_body()?;

    match request.action.as_deref() {
        Some("verifyAccount") => {
            let caller = event.caller()?;
            let account_password = required(
                request.account_password.as_deref(),
                "Account password required",
            )?;

            let verified = service
                .verify_account(&caller.user_id, &caller.username, account_password)
                .await?;
            let status = if verified { 200 } else { 401 };
            json_response(status, &json!({ "verified": verified }))
        }
        Some("set") => {
            let password = required(request.password.as_deref(), "Password required")?;

            service.set_lock_password(&user_id, password).await?;
            json_response(200, &json!({ "message": "Password set" }))
        }
        Some("verify") => {
            let password = required(request.password.as_deref(), "Password required")?;

            let success = service.verify_lock_password(&user_id, password).await?;
            let status = if success { 200 } else { 401 };
            json_response(status, &json!({ "success": success }))
        }
        _ => Err(AppError::ValidationError("Invalid action".to_string())),
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> AppResult<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::ValidationError(message.to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting locked-section Lambda function");

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);
    let cognito_client = aws_sdk_cognitoidentityprovider::Client::new(&config);

    let store = DynamoDBService::from_required_env(dynamodb_client).map_err(|e| {
        error!("Failed to initialize DynamoDBService: {}", e);
        e
    })?;
    let verifier = CognitoService::from_env(cognito_client).map_err(|e| {
        error!("Failed to initialize CognitoService: {}", e);
        e
    })?;

    let service = LockedSectionService::new(store, verifier, SystemClock);
    let service = &service;

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        function_handler(service, event).await
    }))
    .await
}
