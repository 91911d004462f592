mod app;
mod components;
mod config;
mod presale;
mod telemetry;
mod ui;

use color_eyre::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
};
use std::io::stdout;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = telemetry::setup_tracing(&config::data_dir()?)?;

    let config = config::Config::load()?;
    let arg = std::env::args().nth(1);
    let landing = config.landing_url(arg.as_deref())?;
    let app = app::App::new(config, landing)?;

    let terminal = ratatui::init();
    execute!(stdout(), EnableBracketedPaste)?;
    let result = app.run(terminal);
    execute!(stdout(), DisableBracketedPaste)?;
    ratatui::restore();
    result
}
