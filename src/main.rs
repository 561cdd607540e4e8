use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use proton_launcher::{
    cli::{Cli, Commands},
    config::Config,
    games::{GameEntry, GameListStore},
    settings::{Preferences, SettingsEnvelope},
    storage::FileStore,
    Error,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = Config::load()?;
    log::debug!("Configuration loaded");

    let storage = Rc::new(FileStore::new(&config.data_dir)?);
    let mut games = GameListStore::new(Rc::clone(&storage), &config.key_prefix);
    let mut prefs = Preferences::new(storage, &config.key_prefix, &config.default_accent_color);

    let command = cli.command.unwrap_or(Commands::List);

    if !matches!(command, Commands::List | Commands::Status | Commands::Open { .. }) {
        games.subscribe(Box::new(|list: &[GameEntry]| print_games(list)));
    }

    match command {
        Commands::List => print_games(games.games()),

        Commands::Add { name, url, image } => {
            if let Err(e) = games.add(&name, &url, image.as_deref()) {
                fail(e);
            }
        }

        Commands::Remove { index } => {
            if let Err(e) = games.remove_at(index) {
                fail(e);
            }
        }

        Commands::Move { from, to } => {
            if let Err(e) = games.move_to(from, to) {
                fail(e);
            }
        }

        Commands::Open { index } => match games.get(index) {
            Some(game) => {
                if let Err(e) = game.open() {
                    fail(e);
                }
            }
            None => fail(Error::Index {
                index,
                len: games.len(),
            }),
        },

        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| config.export_file_name.clone().into());

            let mut envelope = games.to_envelope(&prefs.accent_color(), prefs.active_tab().as_deref());
            envelope.exported_at = Some(chrono::Utc::now());

            tokio::fs::write(&path, envelope.to_json_pretty()?)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Settings exported to {:?}", path);
        }

        Commands::Import { file } => {
            // The store is only touched once the whole file has been read
            let contents = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;

            let envelope = match SettingsEnvelope::from_json(&contents) {
                Ok(envelope) => envelope,
                Err(e) => fail(e),
            };

            let ignored = envelope.rejected.len();
            match games.apply_envelope(envelope, &mut prefs) {
                Ok(()) => println!("Settings imported successfully!"),
                Err(e) => eprintln!(
                    "Settings imported, but {} field(s) were ignored: {}",
                    ignored, e
                ),
            }
        }

        Commands::Reset { yes } => {
            if !yes && !confirm("Are you sure you want to reset all settings?")? {
                println!("Reset cancelled");
                return Ok(());
            }

            games.reset_to_default();
            prefs.reset()?;
            println!("Settings reset.");
        }

        Commands::Accent { color } => {
            if let Err(e) = prefs.set_accent_color(&color) {
                fail(e);
            }
        }

        Commands::Tab { id } => {
            if let Err(e) = prefs.set_active_tab(&id) {
                fail(e);
            }
        }

        Commands::Status => {
            println!("Proton Launcher Status");
            println!("======================");
            println!();
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Games: {}", games.len());
            println!("Accent Color: {}", prefs.accent_color());
            println!(
                "Active Tab: {}",
                prefs.active_tab().unwrap_or_else(|| "-".to_string())
            );
            println!();
            println!("Configuration:");
            println!("  Data Directory: {:?}", config.data_dir);
            println!("  Key Prefix: {}", config.key_prefix);
            println!("  Log Level: {}", config.log_level);

            if let Ok(config_path) = Config::config_path() {
                println!();
                println!("Config Path: {:?}", config_path);
            }
        }
    }

    Ok(())
}

fn print_games(games: &[GameEntry]) {
    if games.is_empty() {
        println!("No games yet. Add one with 'proton-launcher add <name> <url>'");
        return;
    }

    println!("Games:");
    println!("======");
    for (index, game) in games.iter().enumerate() {
        println!("  [{}] {} - {}", index, game.name, game.url);
        println!("      Image: {}", game.display_image());
    }
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn fail(error: Error) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}
