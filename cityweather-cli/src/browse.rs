//! Interactive flow: country → city → summary → forecast pages.

use std::fmt;

use chrono::Utc;
use cityweather_core::{Action, App, AppState, City, Country, View, WeatherSource};
use inquire::{InquireError, Select};

use crate::render;

const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Past,
    Future,
    Previous,
    Next,
    BackToHome,
    /// Another city of the selected country, keeping the current screen.
    ChangeCity,
    NewSearch,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Past => "7-Days Past",
            Self::Future => "7-Days Future",
            Self::Previous => "⬅ Previous",
            Self::Next => "Next ➡",
            Self::BackToHome => "🏠 Back to Home",
            Self::ChangeCity => "Change city",
            Self::NewSearch => "New search",
            Self::Quit => "Quit",
        })
    }
}

impl MenuItem {
    fn action(self) -> Option<Action> {
        match self {
            Self::Past => Some(Action::ShowPast),
            Self::Future => Some(Action::ShowFuture),
            Self::Previous => Some(Action::Previous),
            Self::Next => Some(Action::Next),
            Self::BackToHome => Some(Action::BackToHome),
            Self::ChangeCity | Self::NewSearch | Self::Quit => None,
        }
    }
}

/// Choices for the current view. Paging entries only appear when they can move.
pub fn menu(state: &AppState<'_>) -> Vec<MenuItem> {
    let has_cities = !state.cities().is_empty();

    match state.view() {
        View::Summary => {
            let mut items = vec![MenuItem::Past, MenuItem::Future];
            if has_cities {
                items.push(MenuItem::ChangeCity);
            }
            items.extend([MenuItem::NewSearch, MenuItem::Quit]);
            items
        }
        View::Forecast { .. } => {
            let mut items = Vec::with_capacity(4);
            if state.can_previous() {
                items.push(MenuItem::Previous);
            }
            if state.can_next() {
                items.push(MenuItem::Next);
            }
            items.push(MenuItem::BackToHome);
            items.push(MenuItem::Quit);
            items
        }
        View::Home if has_cities => {
            vec![MenuItem::ChangeCity, MenuItem::NewSearch, MenuItem::Quit]
        }
        View::Home => vec![MenuItem::NewSearch, MenuItem::Quit],
    }
}

struct CountryOption(Country);

impl fmt::Display for CountryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::country_line(&self.0))
    }
}

struct CityOption(City);

impl fmt::Display for CityOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::city_line(&self.0))
    }
}

enum Answer<T> {
    Chosen(T),
    /// Esc: go up one level.
    Back,
    /// Ctrl-C: leave the program.
    Quit,
}

fn answer<T>(result: Result<T, InquireError>) -> anyhow::Result<Answer<T>> {
    match result {
        Ok(value) => Ok(Answer::Chosen(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Back),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Quit),
        Err(error) => Err(error.into()),
    }
}

fn pick_city(state: &AppState<'_>) -> anyhow::Result<Answer<City>> {
    let cities: Vec<CityOption> = state.cities().iter().cloned().map(CityOption).collect();
    let current = state.selection().city.as_ref();
    let start = cities
        .iter()
        .position(|option| Some(&option.0) == current)
        .unwrap_or(0);

    let picked = answer(
        Select::new("Select City", cities)
            .with_page_size(PAGE_SIZE)
            .with_starting_cursor(start)
            .prompt(),
    )?;

    Ok(match picked {
        Answer::Chosen(CityOption(city)) => Answer::Chosen(city),
        Answer::Back => Answer::Back,
        Answer::Quit => Answer::Quit,
    })
}

/// Select `city` and fetch it. A failure leaves the previous screen in place
/// with the error attached.
async fn look_up<S: WeatherSource>(app: &mut App<'_, S>, city: City) {
    app.dispatch(Action::SelectCity(Some(city.name))).await;
    println!("⏳ Fetching weather…");
    app.dispatch(Action::Submit).await;
}

pub async fn run<S: WeatherSource>(mut app: App<'_, S>) -> anyhow::Result<()> {
    'search: loop {
        let countries: Vec<CountryOption> = app
            .state()
            .countries()
            .iter()
            .cloned()
            .map(CountryOption)
            .collect();
        let country = match answer(
            Select::new("Select Country", countries)
                .with_page_size(PAGE_SIZE)
                .prompt(),
        )? {
            Answer::Chosen(CountryOption(country)) => country,
            Answer::Back | Answer::Quit => return Ok(()),
        };
        app.dispatch(Action::SelectCountry(Some(country.code.clone())))
            .await;

        if app.state().cities().is_empty() {
            println!("No cities listed for {}.", country.name);
            continue;
        }
        match pick_city(app.state())? {
            Answer::Chosen(city) => look_up(&mut app, city).await,
            Answer::Back => continue,
            Answer::Quit => return Ok(()),
        }

        loop {
            println!("\n{}\n", render::screen(app.state(), Utc::now()));

            let choice = match answer(Select::new("Choose", menu(app.state())).prompt())? {
                Answer::Chosen(choice) => choice,
                Answer::Back => match app.state().view() {
                    View::Forecast { .. } => MenuItem::BackToHome,
                    _ => MenuItem::NewSearch,
                },
                Answer::Quit => MenuItem::Quit,
            };

            match choice {
                MenuItem::NewSearch => continue 'search,
                MenuItem::Quit => return Ok(()),
                MenuItem::ChangeCity => match pick_city(app.state())? {
                    Answer::Chosen(city) => look_up(&mut app, city).await,
                    Answer::Back => {}
                    Answer::Quit => return Ok(()),
                },
                other => {
                    if let Some(action) = other.action() {
                        app.dispatch(action).await;
                    }
                }
            }
        }
    }
}
