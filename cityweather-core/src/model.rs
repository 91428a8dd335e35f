use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::precipitation_label;

/// A country from the bundled location dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code, e.g. "JP".
    pub code: String,
    pub name: String,
    /// Dialing code without the leading `+`, e.g. "81".
    pub phone_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country_code: String,
}

/// Current conditions for one location, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Epoch seconds.
    pub sunrise: i64,
    /// Epoch seconds.
    pub sunset: i64,
    /// Shift from UTC in seconds for the location.
    pub utc_offset_secs: i32,
    /// Rain volume over the last hour, absent when it is not raining.
    pub precipitation_mm: Option<f64>,
}

impl CurrentWeather {
    /// The location's UTC offset. Falls back to UTC for out-of-range values.
    pub fn utc_offset(&self) -> FixedOffset {
        offset_or_utc(self.utc_offset_secs)
    }

    pub fn sunrise_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunrise, self.utc_offset())
    }

    pub fn sunset_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunset, self.utc_offset())
    }

    /// Wall-clock time at the location for the given instant.
    pub fn local_time_at(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.utc_offset())
    }

    pub fn precipitation_label(&self) -> String {
        precipitation_label(self.precipitation_mm)
    }
}

/// One raw 3-hour sample from the provider's forecast `list`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastSample {
    /// Epoch seconds.
    pub dt: i64,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<SampleCondition>,
    pub wind: SampleWind,
    #[serde(default)]
    pub rain: Option<SampleRain>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleCondition {
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleWind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleRain {
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

/// One day-level record of a forecast series, live or synthetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub precipitation_mm: Option<f64>,
}

impl ForecastDay {
    pub fn precipitation_label(&self) -> String {
        precipitation_label(self.precipitation_mm)
    }
}

/// Everything one successful lookup produces. Replaced as a whole, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub country: Country,
    pub city: City,
    pub current: CurrentWeather,
    /// Exactly seven synthetic days, oldest first.
    pub past: Vec<ForecastDay>,
    /// Up to seven days sampled from the live forecast.
    pub future: Vec<ForecastDay>,
}

pub(crate) fn offset_or_utc(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or(Utc.fix())
}

fn local_time(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo() -> CurrentWeather {
        CurrentWeather {
            location_name: "Tokyo".to_string(),
            temperature_c: 21.4,
            condition: "Clouds".to_string(),
            humidity_pct: 64,
            wind_speed_mps: 3.6,
            sunrise: 1_700_000_000,
            sunset: 1_700_038_000,
            utc_offset_secs: 9 * 3600,
            precipitation_mm: None,
        }
    }

    #[test]
    fn sunrise_is_shifted_into_location_time() {
        let weather = tokyo();
        let sunrise = weather.sunrise_local().expect("valid timestamp");

        assert_eq!(sunrise.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(sunrise.timestamp(), 1_700_000_000);
        assert_eq!(sunrise.format("%H:%M:%S").to_string(), "07:13:20");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let mut weather = tokyo();
        weather.utc_offset_secs = 200_000;

        assert_eq!(weather.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn forecast_sample_tolerates_missing_rain_and_weather() {
        let sample: ForecastSample = serde_json::from_value(serde_json::json!({
            "dt": 1_700_000_000,
            "main": { "temp": 12.5, "humidity": 70, "pressure": 1012 },
            "wind": { "speed": 4.1, "deg": 200 }
        }))
        .expect("sample should parse");

        assert!(sample.weather.is_empty());
        assert!(sample.rain.is_none());
    }
}
