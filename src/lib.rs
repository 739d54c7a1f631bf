//! Client for the planet catalog of a public science-fiction reference API:
//! a paged planet feed and a planet detail lookup, exposed as observable
//! screen state.
pub mod clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod paging;
pub mod repo;
pub mod utils;
pub mod viewmodels;

pub use clients::{HttpClient, StarWarsApi, StarWarsClient};
pub use config::AppConfig;
pub use domain::{ErrorKind, ErrorState, Outcome, Planet, PlanetListResponse};
pub use errors::{ApiError, ApiResult, ConfigError};
pub use repo::PlanetRepository;
pub use viewmodels::{PlanetDetailsViewModel, PlanetListViewModel};
