//! Reshaping of provider samples into day-level records.
//!
//! The live series comes from the 5-day/3-hour forecast by keeping one sample
//! per 24 hours. The past series is simulated: the free OpenWeather tier has no
//! history endpoint, so those days are drawn at random and must be presented
//! as such.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use rand::Rng;

use crate::model::{ForecastDay, ForecastSample, offset_or_utc};

/// The provider emits one sample every three hours.
pub const SAMPLES_PER_DAY: usize = 8;
pub const MAX_FUTURE_DAYS: usize = 7;
pub const PAST_DAYS: u32 = 7;

const PAST_CONDITIONS: [&str; 3] = ["Clear", "Rain", "Clouds"];
const UNKNOWN_CONDITION: &str = "Unknown";

/// Keep every 8th sample starting at index 0, at most seven of them.
///
/// Dates are taken in the location's local time using `utc_offset_secs`.
/// Fewer than eight samples yield at most one day; nothing is padded.
pub fn to_future_days(samples: &[ForecastSample], utc_offset_secs: i32) -> Vec<ForecastDay> {
    let offset = offset_or_utc(utc_offset_secs);

    samples
        .iter()
        .step_by(SAMPLES_PER_DAY)
        .take(MAX_FUTURE_DAYS)
        .filter_map(|sample| {
            let Some(utc) = DateTime::<Utc>::from_timestamp(sample.dt, 0) else {
                tracing::warn!(dt = sample.dt, "skipping forecast sample with invalid timestamp");
                return None;
            };

            Some(ForecastDay {
                date: utc.with_timezone(&offset).date_naive(),
                temperature_c: sample.main.temp,
                condition: sample
                    .weather
                    .first()
                    .map(|w| w.main.clone())
                    .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
                humidity_pct: sample.main.humidity,
                wind_speed_mps: sample.wind.speed,
                precipitation_mm: sample.rain.as_ref().and_then(|rain| rain.three_hours),
            })
        })
        .collect()
}

/// Seven simulated days ending yesterday, oldest first.
///
/// "Yesterday" is relative to this machine's local date, not the location's.
/// [`to_future_days`] dates by the location's offset, so when the two
/// calendars differ the last past day and the first future day can share a
/// date or leave one out. Callers that need both series on the location's
/// calendar should pass that date to [`synthesize_past_days_with_rng`].
pub fn synthesize_past_days() -> Vec<ForecastDay> {
    let mut rng = rand::rng();
    synthesize_past_days_with_rng(Local::now().date_naive(), &mut rng)
}

pub fn synthesize_past_days_with_rng<R: Rng + ?Sized>(
    today: NaiveDate,
    rng: &mut R,
) -> Vec<ForecastDay> {
    (1..=PAST_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(i64::from(days_ago));
            random_day(date, rng)
        })
        .collect()
}

fn random_day<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> ForecastDay {
    let temperature_c = f64::from(rng.random_range(15..30_i32));
    let condition = PAST_CONDITIONS[rng.random_range(0..PAST_CONDITIONS.len())].to_string();
    let humidity_pct = rng.random_range(50..90_u8);
    let wind_speed_mps = round_tenths(rng.random_range(1.0..6.0));
    let precipitation_mm = rng
        .random_bool(0.5)
        .then(|| round_tenths(rng.random_range(0.0..10.0)));

    ForecastDay {
        date,
        temperature_c,
        condition,
        humidity_pct,
        wind_speed_mps,
        precipitation_mm,
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `"2.5 mm"` when a volume is present, `"No rain"` otherwise.
pub fn precipitation_label(volume_mm: Option<f64>) -> String {
    match volume_mm {
        Some(volume) => format!("{volume} mm"),
        None => "No rain".to_string(),
    }
}
