/// Repository layer: turns catalog calls into `Outcome` values
use crate::clients::StarWarsApi;
use crate::domain::{ErrorKind, ErrorState, Outcome, Planet, PlanetListResponse};
use crate::errors::{ApiError, ServerErrorBody};
use std::sync::Arc;
use tracing::error;

const CONNECTION_TITLE: &str = "Unable to Connect server";
const CONNECTION_MESSAGE: &str =
    "There is a problem connecting to the server. Check your network connection & try again.";
const FALLBACK_MESSAGE: &str = "Oops, something went wrong.";

/// Single source of planet data. Failures never escape as `Err`, they come
/// back as `Outcome::Error`.
#[derive(Clone)]
pub struct PlanetRepository {
    api: Arc<dyn StarWarsApi>,
}

impl PlanetRepository {
    pub fn new(api: Arc<dyn StarWarsApi>) -> Self {
        Self { api }
    }

    /// Fetch one page of planets
    pub async fn get_planets(&self, page: u32) -> Outcome<PlanetListResponse> {
        match self.api.get_planets(page).await {
            Ok(response) => Outcome::success(response),
            Err(e) => handle_error(e),
        }
    }

    /// Fetch a single planet
    pub async fn get_planet_details(&self, planet_id: u32) -> Outcome<Planet> {
        match self.api.get_planet_details(planet_id).await {
            Ok(planet) => Outcome::success(planet),
            Err(e) => handle_error(e),
        }
    }
}

/// Map a failed call onto the error panel contents.
///
/// Connectivity failures come first and always produce the same fixed text.
/// Non-2xx responses are decoded for the server's error body and keep the
/// status code. Everything else carries its own message.
pub fn handle_error<T>(err: ApiError) -> Outcome<T> {
    if err.is_connectivity() {
        error!("Connection failure: {}", err);
        return Outcome::error(
            ErrorState::new(CONNECTION_MESSAGE)
                .with_title(CONNECTION_TITLE)
                .with_type(ErrorKind::Connection),
        );
    }

    match err {
        ApiError::Status { status, body } => {
            let code = status.as_u16();
            // An empty body carries no detail
            let parsed = if body.trim().is_empty() {
                Ok(ServerErrorBody::default())
            } else {
                ServerErrorBody::parse(&body)
            };
            match parsed {
                Ok(server_error) => {
                    error!("Server error {}: {:?}", code, server_error.detail);
                    let message = server_error.detail.unwrap_or_else(|| {
                        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or(""))
                            .trim_end()
                            .to_string()
                    });
                    Outcome::error(
                        ErrorState::new(message)
                            .with_title("Internal Server Error")
                            .with_type(ErrorKind::Server)
                            .with_code(code),
                    )
                }
                Err(e) => {
                    error!("Failed to parse server error body ({}): {}", code, e);
                    Outcome::error(
                        ErrorState::new(non_empty(e.to_string()))
                            .with_title("Failed to parse Data")
                            .with_type(ErrorKind::Decode)
                            .with_code(code),
                    )
                }
            }
        }
        ApiError::Transport(e) => {
            error!("Something went wrong: {}", e);
            Outcome::error(
                ErrorState::new(non_empty(e.to_string()))
                    .with_title("Something went wrong")
                    .with_type(ErrorKind::Generic),
            )
        }
        other => {
            error!("Request failed: {}", other);
            Outcome::error(
                ErrorState::new(non_empty(other.to_string())).with_type(ErrorKind::Generic),
            )
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::FakeApi;
    use crate::domain::fixtures::{page, planet};
    use reqwest::StatusCode;

    fn error_of<T: std::fmt::Debug>(outcome: Outcome<T>) -> ErrorState {
        match outcome {
            Outcome::Error(e) => e,
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_planets_success() {
        let response = page(1..3, false);
        let repo = PlanetRepository::new(Arc::new(FakeApi::with_pages(vec![(
            1,
            response.clone(),
        )])));

        assert_eq!(repo.get_planets(1).await, Outcome::success(response));
    }

    #[tokio::test]
    async fn test_get_planets_server_error_keeps_code() {
        let api = FakeApi::with_pages(vec![(1, page(1..3, true))]);
        api.fail_page(1);
        let repo = PlanetRepository::new(Arc::new(api));

        let e = error_of(repo.get_planets(1).await);
        assert_eq!(e.code, Some(500));
        assert_eq!(e.error_type, Some(ErrorKind::Server));
        assert_eq!(e.message, "Upstream exploded");
    }

    #[tokio::test]
    async fn test_get_planet_details_success() {
        let tatooine = planet(1, "Tatooine");
        let repo = PlanetRepository::new(Arc::new(FakeApi::with_details(vec![tatooine.clone()])));

        assert_eq!(repo.get_planet_details(1).await, Outcome::success(tatooine));
    }

    #[tokio::test]
    async fn test_get_planet_details_not_found() {
        let repo = PlanetRepository::new(Arc::new(FakeApi::default()));

        let e = error_of(repo.get_planet_details(99).await);
        assert_eq!(e.code, Some(404));
        assert_eq!(e.message, "Not found");
        assert_eq!(e.title.as_deref(), Some("Internal Server Error"));
    }

    #[test]
    fn test_handle_error_server_body_without_detail() {
        let e = error_of(handle_error::<()>(ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "{}".to_string(),
        }));
        assert_eq!(e.message, "HTTP 503 Service Unavailable");
        assert_eq!(e.code, Some(503));
    }

    #[test]
    fn test_handle_error_empty_server_body() {
        let e = error_of(handle_error::<()>(ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: "  ".to_string(),
        }));
        assert_eq!(e.error_type, Some(ErrorKind::Server));
        assert_eq!(e.title.as_deref(), Some("Internal Server Error"));
        assert_eq!(e.message, "HTTP 404 Not Found");
        assert_eq!(e.code, Some(404));
    }

    #[test]
    fn test_handle_error_undecodable_server_body() {
        let e = error_of(handle_error::<()>(ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>bad gateway</html>".to_string(),
        }));
        assert_eq!(e.error_type, Some(ErrorKind::Decode));
        assert_eq!(e.title.as_deref(), Some("Failed to parse Data"));
        assert_eq!(e.code, Some(502));
    }

    #[test]
    fn test_handle_error_payload_decode_failure() {
        let decode = serde_json::from_str::<Planet>("{").unwrap_err();
        let e = error_of(handle_error::<()>(ApiError::Decode(decode)));
        assert_eq!(e.error_type, Some(ErrorKind::Generic));
        assert!(e.message.starts_with("Failed to decode response"));
        assert_eq!(e.code, None);
    }

    #[test]
    fn test_handle_error_internal_without_message() {
        let e = error_of(handle_error::<()>(ApiError::Internal(String::new())));
        assert_eq!(e.message, FALLBACK_MESSAGE);
    }
}
