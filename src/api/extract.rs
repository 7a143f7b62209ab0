use crate::api::render::Format;
use crate::domain::message::MessageForm;
use crate::domain::params::{self, ParamValue};
use crate::error::AppError;
use axum::{
    Form,
    extract::{FromRequest, Query, Request},
    http::{Method, header},
};

/// Query-string pairs followed by url-encoded body pairs, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestValues(pub Vec<(String, String)>);

impl RequestValues {
    /// Last value submitted under `key`, the same value [`Self::decode`] keeps.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn format(&self) -> Format {
        Format::parse(self.get("format"))
    }

    /// The `id` parameter, if it is a valid integer.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(|id| id.trim().parse().ok())
    }

    #[must_use]
    pub fn decode(&self) -> ParamValue {
        params::decode(self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    #[must_use]
    pub fn message_form(&self) -> MessageForm {
        MessageForm {
            author: self.get("author").unwrap_or_default().to_owned(),
            message: self.get("message").unwrap_or_default().to_owned(),
        }
    }
}

fn is_form_body(req: &Request) -> bool {
    req.method() != Method::GET
        && req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<S> FromRequest<S> for RequestValues
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut pairs) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|e| AppError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;

        if is_form_body(&req) {
            let Form(body) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid form body: {}", e.body_text())))?;
            pairs.extend(body);
        }

        Ok(Self(pairs))
    }
}
