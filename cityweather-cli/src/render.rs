use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use cityweather_core::{AppState, City, Country, ForecastDay, Series, View, WeatherReport};

const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%a %Y-%m-%d";

pub fn country_line(country: &Country) -> String {
    format!("{:<3} {} (+{})", country.code, country.name, country.phone_code)
}

pub fn city_line(city: &City) -> String {
    city.name.clone()
}

/// The current-conditions panel.
pub fn summary(report: &WeatherReport, now: DateTime<Utc>) -> String {
    let current = &report.current;
    let time = |value: Option<DateTime<chrono::FixedOffset>>| {
        value
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let mut out = String::new();
    let _ = writeln!(out, "Weather in {}", current.location_name);
    let _ = writeln!(out, "📞 Country Code: +{}", report.country.phone_code);
    let _ = writeln!(out, "🌡 Temperature: {} °C", current.temperature_c);
    let _ = writeln!(out, "☁ Condition: {}", current.condition);
    let _ = writeln!(out, "💧 Humidity: {}%", current.humidity_pct);
    let _ = writeln!(out, "🌬 Wind: {} m/s", current.wind_speed_mps);
    let _ = writeln!(
        out,
        "🕒 Local Time: {}",
        current.local_time_at(now).format(TIME_FORMAT)
    );
    let _ = writeln!(out, "🌅 Sunrise: {}", time(current.sunrise_local()));
    let _ = writeln!(out, "🌇 Sunset: {}", time(current.sunset_local()));
    let _ = write!(out, "🌧 Rain: {}", current.precipitation_label());
    out
}

/// One day of a series with its position, e.g. "Day 2 of 5".
pub fn forecast_page(series: Series, day: &ForecastDay, cursor: usize, len: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} · Day {} of {}", series.title(), cursor + 1, len);
    if series == Series::Past {
        out.push_str(" (simulated)");
    }
    out.push('\n');
    out.push_str(&day_block(day));
    out
}

pub fn day_block(day: &ForecastDay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", day.date.format(DATE_FORMAT));
    let _ = writeln!(out, "🌡 Temperature: {} °C", day.temperature_c);
    let _ = writeln!(out, "☁ Condition: {}", day.condition);
    let _ = writeln!(out, "💧 Humidity: {}%", day.humidity_pct);
    let _ = writeln!(out, "🌬 Wind: {} m/s", day.wind_speed_mps);
    let _ = write!(out, "🌧 Rain: {}", day.precipitation_label());
    out
}

/// All days of a series, for non-interactive output.
pub fn series_listing(series: Series, days: &[ForecastDay]) -> String {
    if days.is_empty() {
        return format!("{}: no forecast days available", series.title());
    }

    days.iter()
        .enumerate()
        .map(|(index, day)| forecast_page(series, day, index, days.len()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whatever the current view shows, plus pending/error indicators.
pub fn screen(state: &AppState<'_>, now: DateTime<Utc>) -> String {
    let mut out = match (state.view(), state.report()) {
        (View::Summary, Some(report)) => summary(report, now),
        (View::Forecast { series, cursor }, Some(_)) => match state.current_day() {
            Some(day) => {
                let len = state.active_series().map_or(0, |(_, days)| days.len());
                forecast_page(series, day, cursor, len)
            }
            None => String::new(),
        },
        _ => home(state),
    };

    if state.is_loading() {
        out.push_str("\n⏳ Fetching weather…");
    }
    if let Some(error) = state.error() {
        out.push_str("\n⚠ ");
        out.push_str(error);
    }
    out
}

fn home(state: &AppState<'_>) -> String {
    let selection = state.selection();
    match (&selection.country, &selection.city) {
        (Some(country), Some(city)) => format!("Ready: {}, {}", city.name, country.name),
        (Some(country), None) => format!("{} selected, choose a city.", country.name),
        _ => "Select a country and a city.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use cityweather_core::{Action, CurrentWeather, Effect, LocationDirectory};

    fn report() -> WeatherReport {
        let day = |d: u32, rain: Option<f64>| ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 10, d).expect("date"),
            temperature_c: 21.5,
            condition: "Clear".to_string(),
            humidity_pct: 55,
            wind_speed_mps: 3.2,
            precipitation_mm: rain,
        };

        WeatherReport {
            country: Country {
                code: "JP".into(),
                name: "Japan".into(),
                phone_code: "81".into(),
            },
            city: City {
                name: "Tokyo".into(),
                country_code: "JP".into(),
            },
            current: CurrentWeather {
                location_name: "Tokyo".into(),
                temperature_c: 19.8,
                condition: "Clouds".into(),
                humidity_pct: 68,
                wind_speed_mps: 4.6,
                sunrise: 1_760_648_400,
                sunset: 1_760_689_200,
                utc_offset_secs: 32_400,
                precipitation_mm: Some(0.4),
            },
            past: (10..17).map(|d| day(d, None)).collect(),
            future: vec![day(17, Some(2.5)), day(18, None)],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 3, 0, 0).single().expect("time")
    }

    #[test]
    fn summary_echoes_location_and_local_times() {
        let text = summary(&report(), now());

        assert!(text.starts_with("Weather in Tokyo"));
        assert!(text.contains("📞 Country Code: +81"));
        assert!(text.contains("🌡 Temperature: 19.8 °C"));
        assert!(text.contains("🕒 Local Time: 12:00:00"));
        assert!(text.contains("🌅 Sunrise: 06:00:00"));
        assert!(text.contains("🌇 Sunset: 17:20:00"));
        assert!(text.contains("🌧 Rain: 0.4 mm"));
    }

    #[test]
    fn forecast_page_shows_position_and_rain_label() {
        let report = report();
        let text = forecast_page(Series::Future, &report.future[0], 0, 2);

        assert!(text.starts_with("7-Days Future · Day 1 of 2\n"));
        assert!(text.contains("Sat 2026-10-17"));
        assert!(text.contains("🌧 Rain: 2.5 mm"));
    }

    #[test]
    fn past_pages_are_marked_simulated() {
        let report = report();
        let text = forecast_page(Series::Past, &report.past[6], 6, 7);

        assert!(text.starts_with("7-Days Past · Day 7 of 7 (simulated)"));
        assert!(text.contains("🌧 Rain: No rain"));
    }

    #[test]
    fn series_listing_handles_empty_series() {
        assert_eq!(
            series_listing(Series::Future, &[]),
            "7-Days Future: no forecast days available"
        );

        let report = report();
        let listing = series_listing(Series::Future, &report.future);
        assert!(listing.contains("Day 1 of 2"));
        assert!(listing.contains("Day 2 of 2"));
    }

    #[test]
    fn screen_follows_the_view() {
        let directory = LocationDirectory::bundled().expect("dataset");
        let mut state = AppState::new(directory);
        assert_eq!(screen(&state, now()), "Select a country and a city.");

        state.reduce(Action::SelectCountry(Some("JP".into())));
        state.reduce(Action::SelectCity(Some("Tokyo".into())));
        let Some(Effect::Fetch(request)) = state.reduce(Action::Submit) else {
            panic!("expected fetch");
        };
        assert!(screen(&state, now()).contains("Fetching weather"));

        state.reduce(Action::Loaded {
            request: request.id,
            result: Ok(report()),
        });
        assert!(screen(&state, now()).starts_with("Weather in Tokyo"));

        state.reduce(Action::ShowFuture);
        assert!(screen(&state, now()).starts_with("7-Days Future · Day 1 of 2"));
    }

    #[test]
    fn country_line_pads_code() {
        let country = Country {
            code: "JP".into(),
            name: "Japan".into(),
            phone_code: "81".into(),
        };
        assert_eq!(country_line(&country), "JP  Japan (+81)");
    }
}
