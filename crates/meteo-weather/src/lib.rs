//! Weather forecast fetching, reshaping and caching.
//!
//! The upstream endpoint returns flat hour- and day-indexed arrays; this
//! crate turns them into past, current and forecast days with nested hourly
//! records, and keeps the last result in a [`WeatherStore`].

pub mod cache;
pub mod codes;
pub mod error;
pub mod provider;
mod query;
pub mod reshape;
pub mod store;
pub mod types;
pub mod uv;

pub use cache::{MemoryPersistence, PersistError, PersistedState, StatePersistence, WeatherCache};
pub use codes::describe_weather_code;
pub use error::{ErrorKind, FetchError, Severity};
pub use provider::{WeatherFetcher, WeatherProvider};
pub use reshape::reshape;
pub use store::{next_local_midnight, WeatherStore};
pub use types::*;
pub use uv::{classify_uv, UvRiskLevel};
