//! Response modes shared by the page and action handlers.
//!
//! The same handler answers a browser (HTML page or redirect), a modal dialog
//! (HTML fragment) and a script (`format=json`). A [`Reply`] carries everything
//! needed for all three and picks one when rendered.

use crate::api::templates::Templates;
use crate::error::{AppError, Result};
use axum::{
    Json,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Html,
    Modal,
    Json,
}

impl Format {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("json") => Self::Json,
            Some("modal") => Self::Modal,
            _ => Self::Html,
        }
    }
}

/// Notice category, also reported as `result` in JSON replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Success,
    Warning,
    Dark,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), severity: Severity::Success }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { message: message.into(), severity: Severity::Warning }
    }

    pub fn dark(message: impl Into<String>) -> Self {
        Self { message: message.into(), severity: Severity::Dark }
    }
}

#[derive(Serialize)]
struct JsonReply {
    result: Severity,
    message: String,
    #[serde(flatten)]
    context: Map<String, Value>,
}

#[derive(Debug)]
pub struct Reply {
    format: Format,
    notice: Notice,
    context: Map<String, Value>,
    template: Option<&'static str>,
    redirect: Option<&'static str>,
}

impl Reply {
    /// A reply that renders `template` unless JSON is requested.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if `context` does not serialize to a JSON object.
    pub fn page(template: &'static str, context: impl Serialize) -> Result<Self> {
        Ok(Self {
            format: Format::Html,
            notice: Notice::default(),
            context: to_object(context)?,
            template: Some(template),
            redirect: None,
        })
    }

    /// A JSON-only reply, used for grid data.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if `context` does not serialize to a JSON object.
    pub fn json(context: impl Serialize) -> Result<Self> {
        Ok(Self {
            format: Format::Json,
            notice: Notice::default(),
            context: to_object(context)?,
            template: None,
            redirect: None,
        })
    }

    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn notice(mut self, notice: Notice) -> Self {
        self.notice = notice;
        self
    }

    /// Plain browser requests are sent here instead of getting the page.
    #[must_use]
    pub fn redirect(mut self, to: &'static str) -> Self {
        self.redirect = Some(to);
        self
    }

    /// Produces the HTTP response for the chosen mode.
    ///
    /// # Errors
    /// Returns `AppError::Template` if the page fails to render.
    pub fn render(self, templates: &Templates) -> Result<Response> {
        if self.format == Format::Json {
            let body = JsonReply { result: self.notice.severity, message: self.notice.message, context: self.context };
            return Ok(Json(body).into_response());
        }

        if !self.notice.message.is_empty() {
            tracing::info!(severity = ?self.notice.severity, notice = %self.notice.message, "notice");
        }

        if let (Some(to), Format::Html) = (self.redirect, self.format) {
            return Ok(Redirect::to(to).into_response());
        }

        let Some(template) = self.template else {
            return Ok("No template defined!".into_response());
        };

        let mut context = self.context;
        context.insert("modal".to_owned(), Value::Bool(self.format == Format::Modal));
        context.insert("notice".to_owned(), to_value(&self.notice)?);
        let html = templates.render(template, &context)?;
        Ok(Html(html).into_response())
    }
}

fn to_value(value: impl Serialize) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize reply context");
        AppError::Internal
    })
}

fn to_object(context: impl Serialize) -> Result<Map<String, Value>> {
    match to_value(context)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => {
            tracing::error!(kind = ?other, "Reply context is not an object");
            Err(AppError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse(Some("json")), Format::Json);
        assert_eq!(Format::parse(Some("modal")), Format::Modal);
        assert_eq!(Format::parse(Some("xml")), Format::Html);
        assert_eq!(Format::parse(None), Format::Html);
    }

    #[tokio::test]
    async fn test_json_reply_defaults_to_success() {
        let templates = Templates::new().unwrap();
        let reply = Reply::page("base.html", json!({"section": "Add a message"})).unwrap().format(Format::Json);
        let body = body_json(reply.render(&templates).unwrap()).await;
        assert_eq!(body, json!({"result": "success", "message": "", "section": "Add a message"}));
    }

    #[tokio::test]
    async fn test_json_reply_carries_notice() {
        let templates = Templates::new().unwrap();
        let reply = Reply::page("base.html", ())
            .unwrap()
            .notice(Notice::warning("The message not found or deleted!"))
            .redirect("/")
            .format(Format::Json);
        let body = body_json(reply.render(&templates).unwrap()).await;
        assert_eq!(body["result"], "warning");
        assert_eq!(body["message"], "The message not found or deleted!");
    }

    #[tokio::test]
    async fn test_html_reply_redirects_when_asked() {
        let templates = Templates::new().unwrap();
        let reply = Reply::page("base.html", ()).unwrap().notice(Notice::dark("deleted")).redirect("/");
        let response = reply.render(&templates).unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_modal_reply_renders_instead_of_redirecting() {
        let templates = Templates::new().unwrap();
        let reply = Reply::page("base.html", ()).unwrap().notice(Notice::dark("deleted")).redirect("/").format(Format::Modal);
        let response = reply.render(&templates).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
