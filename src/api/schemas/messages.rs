use crate::domain::grid::{GridPage, MessageField};
use crate::domain::message::MessageForm;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Grid protocol reply, merged into `{result, message, ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub draw: String,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Map<String, Value>>,
}

impl GridResponse {
    #[must_use]
    pub fn new(draw: String, page: GridPage) -> Self {
        Self { draw, records_total: page.total, records_filtered: page.filtered, data: page.rows }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnHeader {
    pub name: &'static str,
    pub label: &'static str,
    pub searchable: bool,
}

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub title: &'static str,
    pub columns: Vec<ColumnHeader>,
    pub page_length: u64,
}

impl IndexContext {
    #[must_use]
    pub fn new(page_length: u64) -> Self {
        let columns = MessageField::PROJECTED
            .into_iter()
            .filter(|field| *field != MessageField::Id)
            .map(|field| ColumnHeader {
                name: field.name(),
                label: field.label(),
                searchable: matches!(field, MessageField::Author | MessageField::Message),
            })
            .collect();
        Self { title: "Messages", columns, page_length }
    }
}

#[derive(Debug, Serialize)]
pub struct FormContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    pub section: &'static str,
    pub action: &'static str,
    pub submit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub form: MessageForm,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl FormContext {
    #[must_use]
    pub fn add(form: MessageForm) -> Self {
        Self {
            title: None,
            section: "Add a message",
            action: "/add",
            submit: "Submit",
            id: None,
            form,
            errors: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn edit(id: i64, form: MessageForm) -> Self {
        Self {
            title: None,
            section: "Edit the message",
            action: "/edit",
            submit: "Update",
            id: Some(id),
            form,
            errors: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn titled(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), ToString::to_string))
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        self
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub data: Map<String, Value>,
}
