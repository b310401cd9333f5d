use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::http::Method;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

use serverless_shared::{
    init_tracing, into_response, json_response, AppResult, Clock, DynamoDBService,
    GuestbookService, GuestbookStore, ProxyRequestExt, SystemClock, GUESTBOOK_TABLE,
};

async fn function_handler<S: GuestbookStore, C: Clock>(
    service: &GuestbookService<S, C>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (event, _context) = event.into_parts();

    info!("Received get-messages request");

    Ok(into_response(handle_request(service, &event).await))
}

async fn handle_request<S: GuestbookStore, C: Clock>(
    service: &GuestbookService<S, C>,
    event: &ApiGatewayProxyRequest,
) -> AppResult<ApiGatewayProxyResponse> {
    event.ensure_method(Method::GET)?;

    let entries = service.list_messages().await?;
    json_response(200, &entries)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting get-messages Lambda function");

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);
    let store = DynamoDBService::from_env(dynamodb_client, GUESTBOOK_TABLE);

    let service = GuestbookService::new(store, SystemClock);
    let service = &service;

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        function_handler(service, event).await
    }))
    .await
}
