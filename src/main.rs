use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use locbook::config::Config;
use locbook::controller::{Action, Dashboard, LocalController};
use locbook::distance::DistanceUnit;
use locbook::error::ConfigError;
use locbook::geocode::{Geocoder, HttpGeocoder};
use locbook::location::{Geo, LatLng};
use locbook::messages::MessageType;
use locbook::segments::PieChart;
use locbook::store::JsonFileStore;
use locbook::theme::Theme;
use locbook::utils::{now_ms, truncate_str};
use locbook::view_state::{FilterUpdate, SortField, SortSpec};
use locbook::{interactive, logging};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "locbook")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Rated location bookmarks in the terminal", long_about = None)]
struct Cli {
    /// Directory holding the location and preference files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Unit for distance annotations
    #[arg(long, global = true, value_enum)]
    unit: Option<DistanceUnit>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal UI (default)
    Ui,
    /// List locations
    List {
        /// Only names containing this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Minimum rate; anything that is not a non-negative number means 0
        #[arg(short, long, allow_hyphen_values = true)]
        min_rate: Option<String>,

        /// Sort field
        #[arg(short, long, value_enum)]
        sort: Option<SortField>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Highlight this location
        #[arg(long)]
        select: Option<String>,

        /// Your position as LAT,LNG, for distances
        #[arg(long, allow_hyphen_values = true, conflicts_with = "locate")]
        at: Option<LatLng>,

        /// Look up your position by IP, for distances
        #[arg(long)]
        locate: bool,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show rate and recency statistics
    Stats {
        /// Print the bucket maps as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a location
    Add {
        /// Rate from 1 to 5
        #[arg(short, long, allow_hyphen_values = true)]
        rate: i64,

        /// Display name (default: "Just a place")
        #[arg(short, long)]
        name: Option<String>,

        /// Coordinates as LAT,LNG
        #[arg(long, allow_hyphen_values = true, required_unless_present = "address")]
        at: Option<LatLng>,

        /// Street address; looked up when --at is missing
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Change the rate of a location
    Rate {
        id: String,
        #[arg(allow_hyphen_values = true)]
        rate: i64,
    },
    /// Remove a location
    Remove {
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show or set the color theme
    Theme {
        #[arg(value_enum)]
        theme: Option<Theme>,
    },
    /// Print a shareable link for a location and the current filter
    Share {
        id: String,

        /// Also copy the link to the clipboard
        #[arg(short, long)]
        copy: bool,
    },
    /// Seed a few sample locations into an empty store
    Demo,
    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file if it does not exist yet
        #[arg(long)]
        init: bool,
    },
}

/// Resolved runtime settings: config file overridden by global flags
struct Settings {
    config: Config,
    data_dir: PathBuf,
    unit: DistanceUnit,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let config = match Config::load() {
            Ok(config) => config,
            // No home directory; still usable with --data-dir
            Err(ConfigError::NoProjectDirectory(_)) => Config::default(),
            Err(e) => return Err(e.into()),
        };
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => config.data_dir()?,
        };
        let unit = cli.unit.unwrap_or(config.distance_unit);
        Ok(Settings {
            config,
            data_dir,
            unit,
        })
    }

    fn geocoder(&self) -> HttpGeocoder {
        HttpGeocoder::new(
            self.config.geocoder_url.clone(),
            self.config.ip_locate_url.clone(),
            self.config.user_agent.clone(),
        )
    }

    async fn controller(&self) -> Result<LocalController> {
        let mut ctrl = LocalController::open(&self.data_dir, self.unit).await;
        let failures: Vec<String> = ctrl
            .take_messages()
            .into_iter()
            .filter(|m| m.message_type == MessageType::Error)
            .map(|m| m.text)
            .collect();
        if !failures.is_empty() {
            return Err(anyhow!(failures.join("; ")));
        }
        Ok(ctrl)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => (),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(&cli)?;

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => run_ui(settings).await,
        command => {
            logging::init();
            tracing::debug!(data_dir = %settings.data_dir.display(), unit = ?settings.unit, "Settings resolved");
            run_command(command, &settings).await
        }
    }
}

async fn run_ui(settings: Settings) -> Result<()> {
    // stdout belongs to the terminal UI, so logs go to a file
    let _guard = logging::init_with_file(&settings.data_dir.join("logs"), "locbook.log")?;
    tracing::info!(data_dir = %settings.data_dir.display(), "Starting interactive UI");

    let geocoder = settings.geocoder();
    let ctrl = LocalController::open(&settings.data_dir, settings.unit).await;
    interactive::run_interactive(ctrl, geocoder, settings.config.share_base_url).await
}

async fn run_command(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Ui => return Err(anyhow!("The interactive UI is not a one-shot command")),
        Commands::List {
            filter,
            min_rate,
            sort,
            desc,
            select,
            at,
            locate,
            json,
        } => {
            let mut ctrl = settings.controller().await?;

            if filter.is_some() || min_rate.is_some() {
                let update = FilterUpdate::from_raw(filter.as_deref(), min_rate.as_deref());
                dispatch(&mut ctrl, Action::SetFilter(update), json).await?;
            }
            if let Some(field) = sort {
                let spec = SortSpec::new(field, desc);
                dispatch(&mut ctrl, Action::SetSort(Some(spec)), json).await?;
            }
            let position = match at {
                Some(pos) => Some(pos),
                None if locate => Some(settings.geocoder().user_position().await?),
                None => None,
            };
            if let Some(pos) = position {
                dispatch(&mut ctrl, Action::Locate(pos), json).await?;
            }
            // Locate clears the selection, so select last
            if let Some(id) = select {
                dispatch(&mut ctrl, Action::Select { id: Some(id) }, json).await?;
            }

            let dashboard = ctrl.dashboard(now_ms());
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard.records)?);
            } else {
                print_records(&dashboard);
            }
        }
        Commands::Stats { json } => {
            let ctrl = settings.controller().await?;
            let dashboard = ctrl.dashboard(now_ms());
            if json {
                let stats = serde_json::json!({
                    "rate": dashboard.rate_stats,
                    "recency": dashboard.recency_stats,
                    "rateGradient": dashboard.rate_chart.conic_gradient(),
                    "recencyGradient": dashboard.recency_chart.conic_gradient(),
                });
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_chart("By rate", &dashboard.rate_chart, dashboard.rate_stats.total());
                println!();
                print_chart(
                    "By last update",
                    &dashboard.recency_chart,
                    dashboard.recency_stats.total(),
                );
            }
        }
        Commands::Add {
            rate,
            name,
            at,
            address,
        } => {
            let mut ctrl = settings.controller().await?;
            let geo = match (at, address) {
                (Some(pos), address) => Geo::new(pos.lat, pos.lng, address.unwrap_or_default()),
                (None, Some(address)) => settings.geocoder().lookup_address(&address).await?,
                (None, None) => return Err(anyhow!("Either --at or --address is required")),
            };
            let action = Action::AddLocation {
                name: name.unwrap_or_default(),
                rate,
                geo,
            };
            dispatch(&mut ctrl, action, false).await?;
            if let Some(loc) = ctrl.selected_location() {
                println!("ID: {}", loc.id);
            }
        }
        Commands::Rate { id, rate } => {
            let mut ctrl = settings.controller().await?;
            dispatch(&mut ctrl, Action::UpdateRate { id, rate }, false).await?;
        }
        Commands::Remove { id, yes } => {
            let mut ctrl = settings.controller().await?;
            handle_remove(&mut ctrl, id, yes).await?;
        }
        Commands::Theme { theme } => {
            let mut ctrl = settings.controller().await?;
            match theme {
                Some(theme) => dispatch(&mut ctrl, Action::ChooseTheme(theme), false).await?,
                None => {
                    let theme = ctrl.theme();
                    let colors = theme.colors();
                    println!("{} ({} {} {})", theme, colors.bg1, colors.bg2, colors.bg3);
                }
            }
        }
        Commands::Share { id, copy } => {
            let mut ctrl = settings.controller().await?;
            dispatch(&mut ctrl, Action::Select { id: Some(id) }, true).await?;
            let url = ctrl.share_url(&settings.config.share_base_url)?;
            println!("{}", url);
            if copy {
                let mut clipboard = arboard::Clipboard::new()
                    .map_err(|e| anyhow!("Clipboard unavailable: {}", e))?;
                clipboard
                    .set_text(url.to_string())
                    .map_err(|e| anyhow!("Failed to copy link: {}", e))?;
                println!("✓ Link copied to clipboard");
            }
        }
        Commands::Demo => {
            let store = JsonFileStore::in_dir(&settings.data_dir);
            let added = store.seed_if_empty().await?;
            if added == 0 {
                println!("Store already has locations, nothing seeded.");
            } else {
                println!("✓ Seeded {} demo locations into {}", added, store.path().display());
            }
        }
        Commands::Config { init } => {
            let path = Config::get_config_path()
                .ok_or_else(|| anyhow!("No home directory to keep a config file in"))?;
            if init {
                if path.exists() {
                    println!("Config already exists at {}", path.display());
                } else {
                    settings.config.save_to(&path)?;
                    println!("✓ Wrote default config to {}", path.display());
                }
            } else {
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(&settings.config)?);
                println!("# data dir: {}", settings.data_dir.display());
            }
        }
    }

    Ok(())
}

/// Dispatch one action and print its messages
///
/// A failed action becomes an error carrying its last message. `quiet`
/// suppresses success chatter so structured output stays clean.
async fn dispatch(ctrl: &mut LocalController, action: Action, quiet: bool) -> Result<()> {
    let ok = ctrl.dispatch(action).await;
    let mut messages = ctrl.take_messages();

    if ok {
        if !quiet {
            for message in &messages {
                println!("{} {}", message.icon(), message.text);
            }
        }
        return Ok(());
    }

    let failure = messages
        .pop()
        .map(|m| m.text)
        .unwrap_or_else(|| "Action failed".to_string());
    Err(anyhow!(failure))
}

async fn handle_remove(ctrl: &mut LocalController, id: String, yes: bool) -> Result<()> {
    let loc = ctrl
        .locations()
        .iter()
        .find(|loc| loc.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("Location not found: {}", id))?;

    println!("\n=== Remove Location ===");
    println!("  ID:      {}", loc.id);
    println!("  Name:    {}", loc.name);
    println!("  Address: {}", if loc.geo.address.is_empty() { "-" } else { loc.geo.address.as_str() });
    println!("  Rate:    {}", loc.stars());

    if !yes {
        println!("\nAre you sure you want to remove this location? (y/N)");

        let mut confirmation = String::new();
        io::stdin().read_line(&mut confirmation)?;

        if confirmation.trim().to_lowercase() != "y" {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    dispatch(ctrl, Action::RemoveLocation { id }, false).await
}

fn print_records(dashboard: &Dashboard) {
    let filter = &dashboard.filter_by;
    if !filter.txt.is_empty() || filter.min_rate > 0.0 {
        println!("Filter: \"{}\", min rate {}", filter.txt, filter.min_rate);
    }

    println!(
        "\n  {:<6} {:<24} {:<6} {:<12} {:<16} {:<16}",
        "ID", "Name", "Rate", "Distance", "Created", "Updated"
    );
    println!("{}", "-".repeat(86));

    for record in &dashboard.records {
        let marker = if record.active { "▶" } else { " " };
        let distance = record
            .distance
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:<6} {:<24} {:<6} {:<12} {:<16} {:<16}",
            marker,
            record.id,
            truncate_str(&record.name, 24),
            record.stars,
            distance,
            record.created_ago,
            record.updated_ago.as_deref().unwrap_or("-"),
        );
    }

    println!("{}", "-".repeat(86));
    println!("{} locations shown", dashboard.records.len());
}

fn print_chart(title: &str, chart: &PieChart, total: usize) {
    println!("=== {} ===", title);
    if chart.is_empty() {
        println!("  No locations");
        return;
    }
    for entry in &chart.legend {
        let bar = "█".repeat((entry.percent as usize * 30) / 100);
        println!(
            "  {:<8} {:<30} {:>3} ({}%)",
            entry.label, bar, entry.count, entry.percent
        );
    }
    println!("  {:<8} {:<30} {:>3}", "total", "", total);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from([
            "locbook", "list", "-f", "park", "--min-rate", "-2", "-s", "rate", "--desc",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::List {
                filter,
                min_rate,
                sort,
                desc,
                ..
            }) => {
                assert_eq!(filter.as_deref(), Some("park"));
                assert_eq!(min_rate.as_deref(), Some("-2"));
                assert_eq!(sort, Some(SortField::Rate));
                assert!(desc);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_parsing_add_at() {
        let cli = Cli::try_parse_from([
            "locbook", "add", "-r", "4", "--at", "-33.86,151.21", "-n", "Opera",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add { rate, at, name, .. }) => {
                assert_eq!(rate, 4);
                assert_eq!(at, Some(LatLng::new(-33.86, 151.21)));
                assert_eq!(name.as_deref(), Some("Opera"));
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_add_needs_a_position() {
        assert!(Cli::try_parse_from(["locbook", "add", "-r", "3"]).is_err());
        assert!(Cli::try_parse_from(["locbook", "add", "-r", "3", "--at", "nowhere"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["locbook", "stats", "--data-dir", "/tmp/x", "--unit", "mi"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.unit, Some(DistanceUnit::Miles));
        assert!(matches!(cli.command, Some(Commands::Stats { json: false })));
    }

    #[test]
    fn test_cli_default_is_ui() {
        let cli = Cli::try_parse_from(["locbook"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_theme_and_remove() {
        let cli = Cli::try_parse_from(["locbook", "theme", "green"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                theme: Some(Theme::Green)
            })
        ));

        let cli = Cli::try_parse_from(["locbook", "remove", "abc12", "-y"]).unwrap();
        match cli.command {
            Some(Commands::Remove { id, yes }) => {
                assert_eq!(id, "abc12");
                assert!(yes);
            }
            _ => panic!("Expected Remove command"),
        }
    }
}
