//! Country/city weather lookup.
//!
//! A front end feeds [`Action`]s into [`App::dispatch`] and renders the
//! resulting [`AppState`]. The reducer in [`state`] is pure: a submit yields
//! an [`Effect::Fetch`], which [`App`] runs against a [`WeatherSource`] and
//! answers with [`Action::Loaded`]. Responses are tagged with the request id,
//! so a slow answer to an abandoned lookup is dropped instead of overwriting
//! a newer one.
//!
//! Countries and cities come from a [`LocationDirectory`], either the bundled
//! one or a dr5hn export named in the [`Config`].

pub mod app;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod state;

pub use app::{App, fetch_report};
pub use config::{Config, LocationsConfig, ProviderConfig};
pub use error::{ErrorKind, LocationError, WeatherError};
pub use location::LocationDirectory;
pub use model::{City, Country, CurrentWeather, ForecastDay, ForecastSample, WeatherReport};
pub use provider::{WeatherSource, openweather::OpenWeatherProvider, provider_from_config};
pub use state::{Action, AppState, Effect, FetchRequest, Selection, Series, View};
