use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

use skyview_core::{App, AppError, WeatherError};
use skyview_services::{
    request_fetch, FavoriteCity, FavoriteStore, FavoritesCache, ViewState, WeatherView,
};
use skyview_weather::{select, Geocoder, IconCache, SelectedLocation, WeatherProvider};

mod report;

#[derive(Debug, Parser)]
#[command(name = "skyview")]
#[command(about = "Current weather and forecasts for any city")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for a city by name
    Search {
        query: String,

        /// Show the weather for the Nth result (1-based)
        #[arg(long)]
        pick: Option<usize>,

        /// Save the picked city to favorites
        #[arg(long, requires = "pick")]
        save: bool,
    },

    /// Show current weather and forecast
    Show {
        #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "favorite")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        /// Display name for the coordinates
        #[arg(long)]
        label: Option<String>,

        /// Show a saved favorite instead of coordinates
        #[arg(long)]
        favorite: Option<String>,
    },

    /// Manage favorite cities
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Download a weather icon
    Icon {
        code: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// Show or switch the color theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesAction {
    List,
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },
    Remove {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    skyview_core::init()?;

    let cli = Cli::parse();

    run(cli).await.map_err(|e| match e {
        AppError::Other(inner) => inner,
        other => {
            tracing::error!("{}", other);
            anyhow::anyhow!(other.user_message())
        }
    })
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let app = App::new()?;
    app.initialize()?;

    let result = match cli.command {
        Commands::Search { query, pick, save } => search(&app, &query, pick, save).await,
        Commands::Show {
            lat,
            lon,
            label,
            favorite,
        } => show_command(&app, lat, lon, label, favorite).await,
        Commands::Favorites { action } => favorites(&app, action),
        Commands::Icon { code, out } => icon(&app, &code, &out).await,
        Commands::Theme { toggle } => theme(&app, toggle),
    };

    app.shutdown();
    result
}

fn open_favorites(app: &App) -> Result<FavoritesCache, AppError> {
    let store = FavoriteStore::open(&app.database_path())?;
    Ok(FavoritesCache::open(store)?)
}

async fn search(
    app: &App,
    query: &str,
    pick: Option<usize>,
    save: bool,
) -> Result<(), AppError> {
    let config = app.config();
    let geocoder = Geocoder::new(
        &config.geocoding,
        Duration::from_secs(config.weather.timeout_secs),
    )?;

    let candidates = geocoder.search(query).await?;

    let Some(pick) = pick else {
        print!("{}", report::render_candidates(&candidates));
        return Ok(());
    };

    let candidate = pick
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .with_context(|| format!("No result #{} ({} found)", pick, candidates.len()))?;
    let location = select(candidate)?;

    if save {
        let mut cache = open_favorites(app)?;
        let city = cache.add_selection(&location)?;
        println!("Saved {} to favorites\n", city.name);
    }

    show(app, location).await
}

async fn show_command(
    app: &App,
    lat: Option<f64>,
    lon: Option<f64>,
    label: Option<String>,
    favorite: Option<String>,
) -> Result<(), AppError> {
    let location = match (favorite, lat, lon) {
        (Some(name), _, _) => open_favorites(app)?
            .selection_for(&name)
            .with_context(|| format!("No favorite named {}", name.trim()))?,
        (None, Some(lat), Some(lon)) => {
            let label = label.unwrap_or_else(|| format!("{}, {}", lat, lon));
            SelectedLocation::new(label, lat, lon)
        }
        _ => return Err(anyhow::anyhow!("Pass either --lat and --lon or --favorite").into()),
    };

    show(app, location).await
}

async fn show(app: &App, location: SelectedLocation) -> Result<(), AppError> {
    let provider = Arc::new(WeatherProvider::new(&app.config().weather)?);

    let (tx, rx) = std::sync::mpsc::channel();
    let mut view = WeatherView::new();

    request_fetch(&tx, &Handle::current(), provider, view.select(location))
        .await
        .context("Weather task failed")?;
    view.drain(&rx);

    match view.state() {
        ViewState::Ready(data) => {
            print!("{}", report::render_report(data));
            Ok(())
        }
        ViewState::Unavailable(_) => Err(WeatherError::Unavailable.into()),
        ViewState::Idle | ViewState::Loading => {
            Err(anyhow::anyhow!("No weather data received").into())
        }
    }
}

fn favorites(app: &App, action: FavoritesAction) -> Result<(), AppError> {
    let mut cache = open_favorites(app)?;

    match action {
        FavoritesAction::List => {
            print!("{}", report::render_favorites(&cache.list_all()));
        }
        FavoritesAction::Add { name, lat, lon } => {
            cache.add(FavoriteCity::new(name.clone(), lat, lon))?;
            println!("Saved {}", name.trim());
        }
        FavoritesAction::Remove { name } => {
            let existed = cache.contains(&name);
            cache.remove_by_name(&name)?;
            if existed {
                println!("Removed {}", name.trim());
            } else {
                println!("{} was not a favorite", name.trim());
            }
        }
    }

    Ok(())
}

async fn icon(app: &App, code: &str, out: &Path) -> Result<(), AppError> {
    let icons = IconCache::new(&app.config().weather)?;

    let bytes = icons
        .fetch_icon(code)
        .await
        .with_context(|| format!("Icon {} is not available", code))?;

    std::fs::write(out, &bytes[..]).map_err(|e| {
        tracing::error!("Failed to write {}: {}", out.display(), e);
        e
    })?;
    println!("Wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}

fn theme(app: &App, toggle: bool) -> Result<(), AppError> {
    let mut config = app.config().clone();

    if toggle {
        config.ui.theme = config.ui.theme.toggled();
        config.save().context("Failed to save theme")?;
        tracing::info!("Theme switched to {}", config.ui.theme);
    }

    let name = config.ui.theme;
    print!("{}", report::render_palette(name.as_str(), &name.palette()));
    Ok(())
}
