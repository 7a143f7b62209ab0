use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub author: String,
    pub message: String,
    pub created: OffsetDateTime,
    pub updated: OffsetDateTime,
    pub deleted: bool,
}

/// User-editable part of a [`Message`], as submitted by the add and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(custom(function = "required"))]
    pub author: String,
    #[validate(length(min = 2, message = "Field must be at least 2 characters long."))]
    pub message: String,
}

impl MessageForm {
    #[must_use]
    pub fn from_message(message: &Message) -> Self {
        Self { author: message.author.clone(), message: message.message.clone() }
    }
}

/// Whitespace-only input counts as missing.
fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("This field is required.".into());
        return Err(error);
    }
    Ok(())
}
