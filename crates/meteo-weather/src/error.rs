//! Fetch error value returned by the fetch client and held by the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Timeout or connectivity failure.
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// Non-2xx answer from the server.
    #[serde(rename = "API_ERROR")]
    Api,
    /// Structurally invalid data. Not raised today.
    #[serde(rename = "DATA_ERROR")]
    Data,
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

/// Presentation tier only; never drives control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub kind: ErrorKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

pub const TIMEOUT_STATUS: u16 = 408;

impl FetchError {
    pub fn new(kind: ErrorKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            info: None,
            kind,
            severity,
            status: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The request did not settle within the timeout.
    pub fn timeout() -> Self {
        Self::new(
            ErrorKind::Network,
            Severity::Warning,
            "The weather service took too long to respond",
        )
        .with_info("Check your connection and try again in a few moments")
        .with_status(TIMEOUT_STATUS)
    }

    /// 5xx from the server.
    pub fn server(status: u16) -> Self {
        Self::new(
            ErrorKind::Api,
            Severity::Error,
            format!("The weather service failed with status {status}"),
        )
        .with_info("The service is having trouble; try again later")
        .with_status(status)
    }

    /// 4xx from the server, other than 408.
    pub fn client(status: u16) -> Self {
        Self::new(
            ErrorKind::Api,
            Severity::Warning,
            format!("The weather service rejected the request with status {status}"),
        )
        .with_info("Check the coordinates and requested fields")
        .with_status(status)
    }

    /// Any other non-2xx status.
    pub fn unexpected_status(status: u16) -> Self {
        Self::new(
            ErrorKind::Unknown,
            Severity::Error,
            format!("Unexpected response status {status}"),
        )
        .with_status(status)
    }

    /// Anything uncategorised: transport failures, malformed bodies.
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Unknown,
            Severity::Error,
            "An unexpected error occurred while fetching the weather",
        )
        .with_info(detail)
        .with_status(0)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Network && self.status == Some(TIMEOUT_STATUS)
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match &self.info {
            Some(info) => format!("{}. {}", self.message, info),
            None => self.message.clone(),
        }
    }
}
