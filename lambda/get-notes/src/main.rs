use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::http::Method;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

use serverless_shared::{
    init_tracing, into_response, json_response, AppResult, Clock, DynamoDBService, NoteStore,
    NotesService, ProxyRequestExt, SystemClock, NOTES_TABLE,
};

async fn function_handler<S: NoteStore, C: Clock>(
    service: &NotesService<S, C>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (event, _context) = event.into_parts();

    info!("Received get-notes request");

    Ok(into_response(handle_request(service, &event).await))
}

async fn handle_request<S: NoteStore, C: Clock>(
    service: &NotesService<S, C>,
    event: &ApiGatewayProxyRequest,
) -> AppResult<ApiGatewayProxyResponse> {
    event.ensure_method(Method::GET)?;
    let user_id = event.user_id()?;

    let notes = service.list_notes(&user_id).await?;
    json_response(200, &notes)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting get-notes Lambda function");

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);
    let store = DynamoDBService::from_env(dynamodb_client, NOTES_TABLE);

    let service = NotesService::new(store, SystemClock);
    let service = &service;

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        function_handler(service, event).await
    }))
    .await
}
