//! Runs the state machine's effects against a [`WeatherSource`].

use crate::error::WeatherError;
use crate::location::LocationDirectory;
use crate::model::WeatherReport;
use crate::normalize::{synthesize_past_days, to_future_days};
use crate::provider::WeatherSource;
use crate::state::{Action, AppState, Effect, FetchRequest};

/// Fetch current conditions and the forecast for one request and build a report.
///
/// Both requests run concurrently; the report is only built once both succeed.
pub async fn fetch_report<S>(source: &S, request: &FetchRequest) -> Result<WeatherReport, WeatherError>
where
    S: WeatherSource + ?Sized,
{
    let city = request.city.name.as_str();
    let country_code = request.country.code.as_str();

    let (current, samples) = tokio::try_join!(
        source.fetch_current(city, country_code),
        source.fetch_forecast_samples(city, country_code),
    )?;

    let future = to_future_days(&samples, current.utc_offset_secs);
    let past = synthesize_past_days();

    tracing::info!(
        request = request.id,
        location = %current.location_name,
        future_days = future.len(),
        "weather report ready"
    );

    Ok(WeatherReport {
        country: request.country.clone(),
        city: request.city.clone(),
        current,
        past,
        future,
    })
}

#[derive(Debug)]
pub struct App<'d, S> {
    source: S,
    state: AppState<'d>,
}

impl<'d, S: WeatherSource> App<'d, S> {
    pub fn new(directory: &'d LocationDirectory, source: S) -> Self {
        Self {
            source,
            state: AppState::new(directory),
        }
    }

    pub fn state(&self) -> &AppState<'d> {
        &self.state
    }

    /// Apply an action and run whatever it asks for until the state settles.
    pub async fn dispatch(&mut self, action: Action) -> &AppState<'d> {
        let mut next = self.state.reduce(action);

        while let Some(effect) = next {
            next = match effect {
                Effect::Fetch(request) => {
                    let result = fetch_report(&self.source, &request).await;
                    self.state.reduce(Action::Loaded {
                        request: request.id,
                        result,
                    })
                }
            };
        }

        &self.state
    }
}
