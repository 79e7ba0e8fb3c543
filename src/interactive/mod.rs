//! Interactive terminal UI for browsing and rating locations
//!
//! A list of saved places on the left, the selected place with rate and
//! recency charts on the right, and single-key commands for everything the
//! controller can do.

pub mod app;
pub mod events;
pub mod form;
pub mod form_ui;
pub mod location_details;
pub mod location_list;
pub mod stats_chart;
pub mod ui;
pub mod utils;

pub use app::App;
pub use events::{AppEvent, EventHandler};

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::controller::LocalController;
use crate::geocode::Geocoder;

/// Run the interactive UI until the user quits
pub async fn run_interactive<G: Geocoder + 'static>(
    ctrl: LocalController,
    geocoder: G,
    share_base_url: String,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ctrl, Box::new(geocoder), share_base_url);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Interactive UI stopped");
    }
    res
}

/// Main application loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    let event_handler = EventHandler::new();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if !app.handle_event(key).await? {
                    break;
                }
            }
            AppEvent::Tick => app.on_tick(),
        }
    }

    tracing::info!("Interactive UI closed");
    Ok(())
}
