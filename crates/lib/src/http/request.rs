//! Outbound request descriptions.
//!
//! An [`ApiRequest`] is a re-dispatchable description of one API call:
//! method, path, body, and the one-shot retry marker used by the session
//! refresh interceptor. Bodies are kept in a rebuildable form (JSON value or
//! multipart spec) so the identical request can be sent again after a
//! successful token refresh.

use reqwest::{Method, multipart};
use serde::Serialize;
use serde_json::Value;

use crate::Result;

/// An uploadable file: name, declared content type, raw bytes.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub enum MultipartPart {
    Text { name: String, value: String },
    File { name: String, upload: FileUpload },
}

/// A rebuildable multipart form body.
#[derive(Debug, Clone, Default)]
pub struct MultipartSpec {
    parts: Vec<MultipartPart>,
}

impl MultipartSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, upload: FileUpload) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            upload,
        });
        self
    }

    /// Build a fresh `reqwest` form from this spec.
    ///
    /// Forms are single-use in reqwest, so each dispatch (including the
    /// post-refresh retry) rebuilds one from the spec.
    pub(crate) fn to_form(&self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for part in &self.parts {
            match part {
                MultipartPart::Text { name, value } => {
                    form = form.text(name.clone(), value.clone());
                }
                MultipartPart::File { name, upload } => {
                    let file_part = multipart::Part::bytes(upload.bytes.clone())
                        .file_name(upload.file_name.clone())
                        .mime_str(&upload.content_type)
                        .map_err(|e| super::HttpError::InvalidPath {
                            path: name.clone(),
                            reason: format!("invalid content type: {e}"),
                        })?;
                    form = form.part(name.clone(), file_part);
                }
            }
        }
        Ok(form)
    }
}

/// Request body variants.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartSpec),
}

/// A single outbound API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Body,
    /// One-shot marker: set once the request has been re-dispatched after a
    /// session refresh. Each request carries its own marker, so concurrent
    /// requests never share retry state.
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Body::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body, overriding the JSON default.
    pub fn multipart(mut self, spec: MultipartSpec) -> Self {
        self.body = Body::Multipart(spec);
        self
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this request has already been retried after a refresh.
    pub fn retried(&self) -> bool {
        self.retried
    }
}
