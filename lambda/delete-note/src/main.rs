use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::http::Method;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::json;
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

    info!("Received delete-note request");

    Ok(into_response(handle_request(service, &event).await))
}

async fn handle_request<S: NoteStore, C: Clock>(
    service: &NotesService<S, C>,
    event: &ApiGatewayProxyRequest,
) -> AppResult<ApiGatewayProxyResponse> {
    event.ensure_method(Method::DELETE)?;
    let user_id = event.user_id()?;

    service
        .delete_note(&user_id, event.query_parameter("noteId"))
        .await?;

    json_response(200, &json!({ "message": "Note permanently deleted" }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    info!("Starting delete-note Lambda function");

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

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lambda_events::encodings::Body;
    use serverless_shared::{CreateNoteRequest, InMemoryStore};

    fn delete(sub: &str, note_id: Option<&str>) -> ApiGatewayProxyRequest {
        serde_json::from_value(json!({
            "httpMethod": "DELETE",
            "queryStringParameters": note_id.map(|id| json!({ "noteId": id })),
            "requestContext": { "httpMethod": "DELETE", "authorizer": { "claims": { "sub": sub, "cognito:username": sub } } }
        }))
        .unwrap()
    }

    fn body(response: &ApiGatewayProxyResponse) -> serde_json::Value {
        match &response.body {
            Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
            _ => serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_delete_removes_note_and_is_idempotent() {
        let store = InMemoryStore::new();
        let service = NotesService::new(store.clone(), SystemClock);
        let note = service
            .create_note("sub-alice", CreateNoteRequest::default())
            .await
            .unwrap();

        for _ in 0..2 {
            let response = into_response(
                handle_request(&service, &delete("sub-alice", Some(&note.note_id))).await,
            );
            assert_eq!(response.status_code, 200);
            assert_eq!(body(&response)["message"], "Note permanently deleted");
        }

        assert!(store.note("sub-alice", &note.note_id).is_none());
    }

    #[tokio::test]
    async fn test_cannot_delete_another_users_note() {
        let store = InMemoryStore::new();
        let service = NotesService::new(store.clone(), SystemClock);
        let note = service
            .create_note("sub-alice", CreateNoteRequest::default())
            .await
            .unwrap();

        let response =
            into_response(handle_request(&service, &delete("sub-bob", Some(&note.note_id))).await);

        assert_eq!(response.status_code, 200);
        assert!(store.note("sub-alice", &note.note_id).is_some());
    }

    #[tokio::test]
    async fn test_missing_note_id_is_bad_request() {
        let service = NotesService::new(InMemoryStore::new(), SystemClock);

        let response = into_response(handle_request(&service, &delete("sub-alice", None)).await);

        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response)["error"], "noteId is required");
    }
}
