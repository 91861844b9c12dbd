//! Extractors that report malformed input through [`AppError::Validation`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Request,
    },
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Path parameters; a parse failure is a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

/// Query string; a parse failure is a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// JSON body deserialized and checked with [`Validate`].
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(
            vec![json!({ "field": "body", "code": "invalid_json", "message": rejection.body_text() })],
            "Invalid request body",
        )
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(
            vec![json!({ "field": "params", "code": "invalid_path", "message": rejection.body_text() })],
            "Invalid path parameters",
        )
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(
            vec![json!({ "field": "querystring", "code": "invalid_query", "message": rejection.body_text() })],
            "Invalid query parameters",
        )
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<serde_json::Value> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();
                errors.iter().map(move |error| {
                    json!({
                        "field": field,
                        "code": error.code,
                        "message": error.message,
                    })
                })
            })
            .collect();
        details.sort_by(|a, b| a["field"].as_str().cmp(&b["field"].as_str()));

        AppError::validation(details, "Invalid request body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 4))]
        title: String,
        #[validate(email)]
        email: String,
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_payload_passes() {
        let request = json_request(r#"{"title":"Unite Summit","email":"ana@example.com"}"#);
        let ValidJson(payload) = ValidJson::<Payload>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(payload.title, "Unite Summit");
    }

    #[tokio::test]
    async fn field_errors_are_listed_per_field() {
        let request = json_request(r#"{"title":"abc","email":"not-an-email"}"#);
        let err = ValidJson::<Payload>::from_request(request, &())
            .await
            .unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                let fields: Vec<_> = details
                    .iter()
                    .map(|d| d["field"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(fields, vec!["email", "title"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let request = json_request(r#"{"title": 12"#);
        let err = ValidJson::<Payload>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
