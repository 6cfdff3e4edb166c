//! Terminal client for the weather lookup proxy.
//!
//! Searches by city or coordinates, prints current conditions and the daily
//! forecast, and keeps search history, favorites and the theme preference in
//! a local store file.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_lookup::client::{CurrentConditions, ProxyClient, WeatherView, DEFAULT_PROXY_URL};
use weather_lookup::models::LocationQuery;
use weather_lookup::services::aggregate::DailyBucket;
use weather_lookup::store::{FileStore, SearchRecord, SearchStore};

#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup client")]
struct Cli {
    /// Base URL of the weather lookup proxy.
    #[arg(long, env = "WEATHER_PROXY_URL", default_value = DEFAULT_PROXY_URL)]
    server: String,

    /// Store file for history, favorites and theme.
    #[arg(long, env = "WEATHER_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct LocationArgs {
    /// City name, e.g. "Paris".
    #[arg(long)]
    city: Option<String>,
    /// Latitude; with --lon, takes precedence over --city.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,
    /// Longitude.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,
}

impl LocationArgs {
    fn to_query(&self) -> anyhow::Result<LocationQuery> {
        Ok(LocationQuery::from_parts(
            self.city.as_deref(),
            self.lat.as_deref(),
            self.lon.as_deref(),
        )?)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show current conditions and the daily forecast for a location.
    Search {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Repeat a search from history or favorites by its timestamp.
    Replay {
        timestamp: i64,
    },
    /// List recent searches, newest first.
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List saved favorites.
    Favorites,
    /// Add or remove a favorite.
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Show or change the display theme.
    Theme {
        mode: Option<ThemeMode>,
    },
}

#[derive(Debug, Subcommand)]
enum FavoriteAction {
    /// Save a location; saving the same location twice does nothing.
    Add {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Remove the favorite with this timestamp.
    Remove { timestamp: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

impl Cli {
    async fn run(self) -> anyhow::Result<()> {
        let path = match self.store {
            Some(path) => path,
            None => FileStore::default_path()?,
        };
        let backend = FileStore::open(&path)
            .with_context(|| format!("Failed to open store {}", path.display()))?;
        let mut store = SearchStore::load(backend)?;
        let view = WeatherView::new(ProxyClient::new(&self.server));

        match self.command {
            Command::Search { location } => {
                let query = location.to_query()?;
                search(&view, &mut store, &query).await?;
            }
            Command::Replay { timestamp } => {
                let query = store
                    .history()
                    .iter()
                    .chain(store.favorites())
                    .find(|r| r.timestamp == timestamp)
                    .and_then(SearchRecord::query)
                    .ok_or_else(|| anyhow!("No saved search with timestamp {timestamp}"))?;
                search(&view, &mut store, &query).await?;
            }
            Command::History { limit } => {
                if store.history().is_empty() {
                    println!("No recent searches.");
                }
                for record in store.history().iter().take(limit) {
                    println!("{:>14}  {}", record.timestamp, record);
                }
            }
            Command::Favorites => {
                if store.favorites().is_empty() {
                    println!("No favorites yet.");
                }
                for record in store.favorites() {
                    println!("{:>14}  {}", record.timestamp, record);
                }
            }
            Command::Favorite { action } => match action {
                FavoriteAction::Add { location } => {
                    let query = location.to_query()?;
                    if store.add_favorite(&query)? {
                        println!("Added {query} to favorites.");
                    } else {
                        println!("{query} is already a favorite.");
                    }
                }
                FavoriteAction::Remove { timestamp } => {
                    if store.remove_favorite(timestamp)? {
                        println!("Removed favorite {timestamp}.");
                    } else {
                        println!("No favorite with timestamp {timestamp}.");
                    }
                }
            },
            Command::Theme { mode } => {
                match mode {
                    Some(ThemeMode::Dark) => store.set_dark_mode(true)?,
                    Some(ThemeMode::Light) => store.set_dark_mode(false)?,
                    Some(ThemeMode::Toggle) => {
                        store.toggle_dark_mode()?;
                    }
                    None => {}
                }
                println!("Theme: {}", if store.dark_mode() { "dark" } else { "light" });
            }
        }

        Ok(())
    }
}

/// Run both lookups for `query`, record it in history and print the results.
async fn search(
    view: &WeatherView,
    store: &mut SearchStore<FileStore>,
    query: &LocationQuery,
) -> anyhow::Result<()> {
    // Recorded up front so failed lookups still show up in history.
    store.record_search(query)?;

    let Some(lookup) = view.search(query).await else {
        return Ok(());
    };

    println!("Weather at {}", lookup.query);
    match &lookup.current {
        Ok(current) => print_current(current),
        Err(e) => eprintln!("Error retrieving weather data: {e}"),
    }

    println!();
    println!("Forecast");
    match &lookup.forecast {
        Ok(days) => print_forecast(days),
        Err(e) => eprintln!("Error retrieving forecast: {e}"),
    }

    if lookup.is_complete() {
        Ok(())
    } else {
        Err(anyhow!("Lookup for {query} failed"))
    }
}

fn print_current(current: &CurrentConditions) {
    if let Some(name) = &current.name {
        println!("  Place:       {name}");
    }
    if let Some(c) = &current.coords {
        println!("  Position:    ({:.2}, {:.2})", c.lat, c.lon);
    }
    println!("  Temperature: {} °C", current.temperature);
    println!("  Conditions:  {}", current.description);
    println!("  Humidity:    {} %", current.humidity);
}

fn print_forecast(days: &[DailyBucket]) {
    if days.is_empty() {
        println!("  No forecast available.");
    }
    for day in days {
        println!(
            "  {:<12} {:>6.1} °C  {:>3} %  {}",
            day.date.format("%a %d %b"),
            day.entry.temperature,
            day.entry.humidity,
            day.entry.description
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_lookup=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Cli::parse().run().await
}
