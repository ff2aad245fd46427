use axum::body::Bytes;
use serde_json::Value;

use super::endpoint::{BodyTransform, Endpoint};
use crate::error::ApiError;

/// Request body as it will be sent upstream
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    None,
    Json(Value),
    Form(String),
    Multipart { content_type: String, body: Bytes },
}

pub fn prepare(endpoint: &Endpoint, content_type: Option<&str>, body: &Bytes) -> Result<Outbound, ApiError> {
    match endpoint.body {
        BodyTransform::Empty => Ok(Outbound::None),
        BodyTransform::Json => {
            let value = parse_json(body)?;
            require_fields(&value, endpoint.required_fields)?;
            Ok(Outbound::Json(value))
        }
        BodyTransform::JsonToForm => {
            let value = parse_json(body)?;
            require_fields(&value, endpoint.required_fields)?;
            Ok(Outbound::Form(to_form(&value, endpoint.form_renames)?))
        }
        BodyTransform::Multipart => {
            let content_type = content_type
                .filter(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
                .ok_or_else(|| ApiError::bad_request("Expected a multipart/form-data upload"))?;
            if body.is_empty() {
                return Err(ApiError::bad_request("No file provided"));
            }
            Ok(Outbound::Multipart {
                content_type: content_type.to_string(),
                body: body.clone(),
            })
        }
    }
}

/// Parse a JSON request body; an empty body reads as an empty object
pub fn parse_json(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON body"))
}

/// Presence check: each field must exist, not be null, and not be a blank string
pub fn require_fields(value: &Value, fields: &[&str]) -> Result<(), ApiError> {
    for field in fields {
        let present = match value.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ApiError::bad_request(format!("{} is required", field)));
        }
    }
    Ok(())
}

fn to_form(value: &Value, renames: &[(&str, &str)]) -> Result<String, ApiError> {
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Expected a JSON object"))?;

    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (key, field) in object {
        let name = renames
            .iter()
            .find(|(from, _)| from == key)
            .map(|(_, to)| *to)
            .unwrap_or(key.as_str());

        match field {
            Value::Null => continue,
            Value::String(s) => form.append_pair(name, s),
            other => form.append_pair(name, &other.to_string()),
        };
    }
    Ok(form.finish())
}
