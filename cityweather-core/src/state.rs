//! View state machine.
//!
//! All user-visible state lives in [`AppState`] and changes only through
//! [`AppState::reduce`]. The reducer never performs I/O: a submit returns an
//! [`Effect::Fetch`] that the caller executes and answers with
//! [`Action::Loaded`]. Each fetch carries a request id so that a completion
//! for anything but the latest submit is dropped.

use serde::Serialize;

use crate::error::WeatherError;
use crate::location::LocationDirectory;
use crate::model::{City, Country, ForecastDay, WeatherReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Past,
    Future,
}

impl Series {
    pub fn title(self) -> &'static str {
        match self {
            Self::Past => "7-Days Past",
            Self::Future => "7-Days Future",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Nothing loaded yet for the current selection.
    #[default]
    Home,
    /// Current-conditions panel for the loaded report.
    Summary,
    /// One day of a series; `cursor` is always a valid index into it.
    Forecast { series: Series, cursor: usize },
}

/// Pending country/city choice. A city is only ever set together with its country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub country: Option<Country>,
    pub city: Option<City>,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        self.country.is_some() && self.city.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: u64,
    pub country: Country,
    pub city: City,
}

#[derive(Debug)]
pub enum Action {
    /// Pick a country by ISO code; `None` clears it.
    SelectCountry(Option<String>),
    /// Pick a city of the selected country by name; `None` clears it.
    SelectCity(Option<String>),
    Submit,
    Loaded {
        request: u64,
        result: Result<WeatherReport, WeatherError>,
    },
    ShowPast,
    ShowFuture,
    Previous,
    Next,
    /// Leave the forecast pages for the current-conditions panel.
    BackToHome,
}

/// Work the caller has to do on behalf of the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
}

#[derive(Debug, Clone)]
pub struct AppState<'d> {
    directory: &'d LocationDirectory,
    selection: Selection,
    cities: Vec<City>,
    report: Option<WeatherReport>,
    view: View,
    pending: Option<u64>,
    last_request: u64,
    error: Option<String>,
}

impl<'d> AppState<'d> {
    pub fn new(directory: &'d LocationDirectory) -> Self {
        Self {
            directory,
            selection: Selection::default(),
            cities: Vec::new(),
            report: None,
            view: View::Home,
            pending: None,
            last_request: 0,
            error: None,
        }
    }

    pub fn reduce(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::SelectCountry(code) => {
                self.select_country(code.as_deref());
                None
            }
            Action::SelectCity(name) => {
                self.select_city(name.as_deref());
                None
            }
            Action::Submit => self.submit().map(Effect::Fetch),
            Action::Loaded { request, result } => {
                self.loaded(request, result);
                None
            }
            Action::ShowPast => {
                self.show_series(Series::Past);
                None
            }
            Action::ShowFuture => {
                self.show_series(Series::Future);
                None
            }
            Action::Previous => {
                self.move_cursor(|cursor, _| cursor.saturating_sub(1));
                None
            }
            Action::Next => {
                self.move_cursor(|cursor, len| (cursor + 1).min(len - 1));
                None
            }
            Action::BackToHome => {
                if matches!(self.view, View::Forecast { .. }) {
                    self.view = View::Summary;
                }
                None
            }
        }
    }

    fn select_country(&mut self, code: Option<&str>) {
        let country = code.and_then(|code| self.directory.country_by_code(code)).cloned();
        if let (None, Some(code)) = (&country, code) {
            tracing::warn!(code, "unknown country code, selection cleared");
        }

        self.cities = country
            .as_ref()
            .map(|country| self.directory.list_cities(&country.code))
            .unwrap_or_default();
        self.selection = Selection {
            country,
            city: None,
        };
        self.report = None;
        self.pending = None;
        self.error = None;
        self.view = View::Home;
    }

    fn select_city(&mut self, name: Option<&str>) {
        let Some(name) = name else {
            self.selection.city = None;
            return;
        };

        match self.cities.iter().find(|city| city.name == name) {
            Some(city) => self.selection.city = Some(city.clone()),
            None => tracing::warn!(city = name, "city is not in the selected country, ignored"),
        }
    }

    fn submit(&mut self) -> Option<FetchRequest> {
        let (Some(country), Some(city)) = (&self.selection.country, &self.selection.city) else {
            tracing::debug!("submit ignored without both country and city");
            return None;
        };

        self.last_request += 1;
        self.pending = Some(self.last_request);
        self.error = None;

        Some(FetchRequest {
            id: self.last_request,
            country: country.clone(),
            city: city.clone(),
        })
    }

    fn loaded(&mut self, request: u64, result: Result<WeatherReport, WeatherError>) {
        if self.pending != Some(request) {
            tracing::debug!(request, pending = ?self.pending, "discarding stale weather result");
            return;
        }
        self.pending = None;

        match result {
            Ok(report) => {
                self.report = Some(report);
                self.view = View::Summary;
                self.error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "weather lookup failed");
                self.error = Some(error.user_message());
            }
        }
    }

    fn show_series(&mut self, series: Series) {
        if self.view != View::Summary {
            return;
        }
        let Some(report) = &self.report else {
            return;
        };

        if series_days(report, series).is_empty() {
            self.error = Some("No forecast days available for this location.".to_string());
            return;
        }

        self.error = None;
        self.view = View::Forecast { series, cursor: 0 };
    }

    fn move_cursor(&mut self, step: impl Fn(usize, usize) -> usize) {
        let View::Forecast { series, cursor } = self.view else {
            return;
        };
        let len = self.series(series).len();
        if len == 0 {
            return;
        }

        self.view = View::Forecast {
            series,
            cursor: step(cursor, len),
        };
    }

    pub fn countries(&self) -> &[Country] {
        self.directory.list_countries()
    }

    /// Cities of the selected country; empty until a country is chosen.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_complete()
    }

    pub fn cursor(&self) -> Option<usize> {
        match self.view {
            View::Forecast { cursor, .. } => Some(cursor),
            _ => None,
        }
    }

    pub fn can_previous(&self) -> bool {
        self.cursor().is_some_and(|cursor| cursor > 0)
    }

    pub fn can_next(&self) -> bool {
        match self.active_series() {
            Some((_, days)) => self.cursor().is_some_and(|cursor| cursor + 1 < days.len()),
            None => false,
        }
    }

    /// The series being paged through, if a forecast view is open.
    pub fn active_series(&self) -> Option<(Series, &[ForecastDay])> {
        match self.view {
            View::Forecast { series, .. } => Some((series, self.series(series))),
            _ => None,
        }
    }

    pub fn current_day(&self) -> Option<&ForecastDay> {
        let (_, days) = self.active_series()?;
        days.get(self.cursor()?)
    }

    fn series(&self, series: Series) -> &[ForecastDay] {
        self.report
            .as_ref()
            .map(|report| series_days(report, series))
            .unwrap_or_default()
    }
}

fn series_days(report: &WeatherReport, series: Series) -> &[ForecastDay] {
    match series {
        Series::Past => &report.past,
        Series::Future => &report.future,
    }
}
