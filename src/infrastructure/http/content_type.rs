use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, Method},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

const JSON: &str = "application/json";

/// Only let JSON requests through to the API.
///
/// A `Content-Type` header may list several media types separated by commas;
/// one of them has to be `application/json`. Requests without the header are
/// accepted unless they are POSTs.
pub async fn json_content_type_middleware(
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match request.headers().get(CONTENT_TYPE) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| {
                AppError::UnsupportedMediaType("Media type not parseable".to_string())
            })?;
            accepts_json(raw)?;
        }
        None if request.method() == Method::POST => {
            return Err(AppError::UnsupportedMediaType(format!(
                "Media type () not supported, expected {JSON}"
            )));
        }
        None => {}
    }

    Ok(next.run(request).await)
}

fn accepts_json(header: &str) -> Result<(), AppError> {
    for part in header.split(',') {
        let essence = media_type_essence(part).ok_or_else(|| {
            AppError::UnsupportedMediaType(format!("Media type ({}) not parseable", part.trim()))
        })?;
        if essence == JSON {
            return Ok(());
        }
    }

    Err(AppError::UnsupportedMediaType(format!(
        "Media type ({header}) not supported"
    )))
}

/// `type/subtype` in lower case, parameters stripped. `None` if the value is
/// not a media type.
fn media_type_essence(value: &str) -> Option<String> {
    let essence = value.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;

    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    Some(essence.to_ascii_lowercase())
}

// RFC 7230 token characters
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
        })
}
