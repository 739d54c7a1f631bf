/// Domain models for the application
use crate::utils::{fallback_id, trailing_id};
use serde::Deserialize;
use std::fmt;

/// A planet as returned by the catalog. Numeric fields stay text, the upstream
/// uses values like "unknown" and "1 standard".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Planet {
    pub name: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    pub surface_water: String,
    pub population: String,
    pub url: String,
}

impl Planet {
    /// Id taken from the resource URL.
    ///
    /// Records whose URL has no trailing numeric segment get a random id in
    /// `[100, 1000)`, drawn again on every call.
    pub fn id(&self) -> u32 {
        trailing_id(&self.url).unwrap_or_else(fallback_id)
    }

    pub fn thumbnail_url(&self, images_base_url: &str) -> String {
        format!("{}id/{}/100", images_base_url, self.id())
    }

    pub fn image_url(&self, images_base_url: &str) -> String {
        format!("{}id/{}/800/600", images_base_url, self.id())
    }
}

/// One page of the planet listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanetListResponse {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    #[serde(rename = "results")]
    pub planets: Vec<Planet>,
}

impl PlanetListResponse {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Category tag of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Server,
    Decode,
    Generic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "Connection Error",
            ErrorKind::Server => "Server Error",
            ErrorKind::Decode => "Decode Error",
            ErrorKind::Generic => "Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the error panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub title: Option<String>,
    pub message: String,
    pub error_type: Option<ErrorKind>,
    pub code: Option<u16>,
}

impl ErrorState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            error_type: None,
            code: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_type(mut self, kind: ErrorKind) -> Self {
        self.error_type = Some(kind);
        self
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {}", title, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// State of a request as seen by a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Idle,
    Loading,
    Success { data: T, message: Option<String> },
    Error(ErrorState),
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome::Success {
            data,
            message: None,
        }
    }

    pub fn error(error: ErrorState) -> Self {
        Outcome::Error(error)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading)
    }

    /// Success and Error end an invocation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Success { .. } | Outcome::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Outcome::Idle
    }
}
