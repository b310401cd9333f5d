//! Helpers over the API Gateway REST proxy event types.
//!
//! The Cognito authorizer places the caller's claims under
//! `requestContext.authorizer.claims`.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use aws_lambda_events::http::{header, HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{AppError, AppResult};

/// The authenticated user a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub username: String,
}

pub trait ProxyRequestExt {
    /// Reject anything but `allowed` with 405
    fn ensure_method(&self, allowed: Method) -> AppResult<()>;

    /// The caller's stable user id (`sub` claim)
    fn user_id(&self) -> AppResult<String>;

    /// Both the `sub` and `cognito:username` claims
    fn caller(&self) -> AppResult<Caller>;

    fn query_parameter(&self, name: &str) -> Option<&str>;

    /// Parse the JSON body. A missing or blank body reads as `{}`.
    fn json_body<T: DeserializeOwned>(&self) -> AppResult<T>;
}

impl ProxyRequestExt for ApiGatewayProxyRequest {
    fn ensure_method(&self, allowed: Method) -> AppResult<()> {
        if self.http_method == allowed {
            Ok(())
        } else {
            Err(AppError::MethodNotAllowed(self.http_method.to_string()))
        }
    }

    fn user_id(&self) -> AppResult<String> {
        claim(self, "sub").ok_or(AppError::Unauthenticated)
    }

    fn caller(&self) -> AppResult<Caller> {
        let user_id = self.user_id()?;
        let username = claim(self, "cognito:username").ok_or(AppError::Unauthenticated)?;

        Ok(Caller { user_id, username })
    }

    fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters.first(name)
    }

    fn json_body<T: DeserializeOwned>(&self) -> AppResult<T> {
        let body = match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => "{}",
        };
        serde_json::from_str(body).map_err(|e| AppError::InvalidJson(e.to_string()))
    }
}

fn claims(request: &ApiGatewayProxyRequest) -> Option<&Map<String, Value>> {
    request.request_context.authorizer.get("claims")?.as_object()
}

fn claim(request: &ApiGatewayProxyRequest, name: &str) -> Option<String> {
    claims(request)?
        .get(name)?
        .as_str()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn response(status_code: u16, body: String) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    ApiGatewayProxyResponse {
        status_code: i64::from(status_code),
        headers,
        multi_value_headers: HeaderMap::new(),
        body: Some(Body::Text(body)),
        is_base64_encoded: false,
    }
}

/// JSON response with the given status code and payload
pub fn json_response<T: Serialize>(status_code: u16, data: &T) -> AppResult<ApiGatewayProxyResponse> {
    Ok(response(status_code, serde_json::to_string(data)?))
}

/// `{"error": message}` with the given status code
pub fn error_response(status_code: u16, message: &str) -> ApiGatewayProxyResponse {
    response(status_code, json!({ "error": message }).to_string())
}

pub fn from_error(err: &AppError) -> ApiGatewayProxyResponse {
    if err.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::warn!("Request rejected: {}", err);
    }
    error_response(err.status_code(), &err.client_message())
}

/// Render a handler result, turning errors into their status responses
pub fn into_response(result: AppResult<ApiGatewayProxyResponse>) -> ApiGatewayProxyResponse {
    result.unwrap_or_else(|e| from_error(&e))
}
