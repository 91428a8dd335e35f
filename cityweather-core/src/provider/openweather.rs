use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::model::{CurrentWeather, ForecastSample};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Every request asks for metric units; nothing else is rendered.
const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Point the client at another host (a proxy or a mock server).
    pub fn with_options(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One GET against `{base_url}/{endpoint}`; returns the body of a 2xx response.
    async fn get(
        &self,
        endpoint: &str,
        city: &str,
        country_code: &str,
    ) -> Result<String, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let location = format!("{city},{country_code}");

        tracing::debug!(%url, %location, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location.as_str()),
                ("units", UNITS),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::LocationNotFound(location));
        }

        if !status.is_success() {
            let message = provider_message(&body).unwrap_or_else(|| truncate_body(&body));
            tracing::warn!(status = status.as_u16(), %message, "OpenWeather request failed");
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    timezone: i32,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<ForecastSample>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

fn parse_current(body: &str) -> Result<CurrentWeather, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|error| WeatherError::Data(format!("current weather payload: {error}")))?;

    let condition = parsed
        .weather
        .first()
        .map(|w| w.main.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(CurrentWeather {
        location_name: parsed.name,
        temperature_c: parsed.main.temp,
        condition,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        utc_offset_secs: parsed.timezone,
        precipitation_mm: parsed.rain.and_then(|rain| rain.one_hour),
    })
}

fn parse_forecast(body: &str) -> Result<Vec<ForecastSample>, WeatherError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)
        .map_err(|error| WeatherError::Data(format!("forecast payload: {error}")))?;

    Ok(parsed.list)
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<CurrentWeather, WeatherError> {
        let body = self.get("weather", city, country_code).await?;
        parse_current(&body)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast_samples(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let body = self.get("forecast", city, country_code).await?;
        let samples = parse_forecast(&body)?;
        tracing::debug!(samples = samples.len(), "forecast received");
        Ok(samples)
    }
}

fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|error| error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
