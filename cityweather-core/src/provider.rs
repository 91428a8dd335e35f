use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::{
    Config,
    error::WeatherError,
    model::{CurrentWeather, ForecastSample},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Remote source of current conditions and raw forecast samples.
///
/// Each call performs a single request; there are no retries.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<CurrentWeather, WeatherError>;

    /// The 5-day/3-hour forecast, in provider order.
    async fn fetch_forecast_samples(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Vec<ForecastSample>, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `cityweather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let provider = OpenWeatherProvider::with_options(
        api_key.to_owned(),
        config.base_url(),
        Duration::from_secs(config.timeout_secs()),
    )?;

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `cityweather configure`"));
    }

    #[test]
    fn provider_from_config_uses_configured_base_url() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.openweather.base_url = Some("http://127.0.0.1:8080/ow".to_string());

        let provider = provider_from_config(&cfg).expect("provider");
        assert_eq!(provider.base_url(), "http://127.0.0.1:8080/ow");
    }

    #[test]
    fn provider_from_config_defaults_to_public_endpoint() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg).expect("provider");
        assert_eq!(provider.base_url(), openweather::DEFAULT_BASE_URL);
    }
}
