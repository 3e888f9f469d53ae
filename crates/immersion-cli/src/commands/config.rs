use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use immersion_config::{Config, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

const PLACEHOLDERS: [&str; 2] = ["YOUR_API_KEY", "YOUR_PROJECT_ID"];

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    match cmd {
        ConfigCommands::Show { full } => show_config(&path_manager, full, output),
        ConfigCommands::Set { key, value } => set_config(&path_manager, &key, &value, output),
        ConfigCommands::Path => show_paths(&path_manager, output),
    }
}

fn load(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

fn show_config(path_manager: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    let config = load(path_manager)?;
    let secret = |value: &str| if full { display_value(value) } else { mask_string(value) };

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "youtube": { "api_key": secret(&config.youtube.api_key) },
            "firebase": config.firebase.as_ref().map(|fb| json!({
                "enabled": fb.enabled,
                "api_key": secret(&fb.api_key),
                "project_id": display_value(&fb.project_id),
                "collection": fb.collection,
            })),
            "sync": {
                "enabled": config.sync.enabled,
                "status_clear_seconds": config.sync.status_clear_seconds,
            },
            "valid": config.validate().is_ok(),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("No configuration file yet at {} (showing defaults)", config_file.display()));
    }

    let mut table = section("YouTube");
    table.add_row(vec![Cell::new("API key"), Cell::new(secret(&config.youtube.api_key))]);
    println!("{}\n", table);

    match &config.firebase {
        Some(firebase) => {
            let mut table = section("Firebase");
            table.add_row(vec![Cell::new("Enabled"), Cell::new(check_mark(firebase.enabled))]);
            table.add_row(vec![Cell::new("API key"), Cell::new(secret(&firebase.api_key))]);
            table.add_row(vec![Cell::new("Project id"), Cell::new(display_value(&firebase.project_id))]);
            table.add_row(vec![Cell::new("Collection"), Cell::new(&firebase.collection)]);
            println!("{}\n", table);
        }
        None => println!("{}\n", "Firebase: Not configured (videos stay on this machine)".bright_black()),
    }

    let mut table = section("Sync");
    table.add_row(vec![Cell::new("Enabled"), Cell::new(check_mark(config.sync.enabled))]);
    table.add_row(vec![
        Cell::new("Status shown for"),
        Cell::new(format!("{}s", config.sync.status_clear_seconds)),
    ]);
    println!("{}\n", table);

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration incomplete: {}", e));
    }
    Ok(())
}

fn set_config(path_manager: &PathManager, key: &str, value: &str, output: &Output) -> Result<()> {
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let mut config = load(path_manager)?;
    config.set_value(key, value).map_err(|e| eyre!("{}", e))?;

    let config_file = path_manager.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Set {}", key));
    output.json(&json!({ "success": true, "key": key }));
    Ok(())
}

fn show_paths(path_manager: &PathManager, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file().display().to_string();
    let credentials_file = path_manager.credentials_file().display().to_string();
    let videos_file = path_manager.videos_file().display().to_string();
    let log_file = path_manager.log_file().display().to_string();

    output.info(format!("Config:      {}", config_file));
    output.info(format!("Credentials: {}", credentials_file));
    output.info(format!("Videos:      {}", videos_file));
    output.info(format!("Log file:    {}", log_file));
    output.json(&json!({
        "config_file": config_file,
        "credentials_file": credentials_file,
        "videos_file": videos_file,
        "log_file": log_file,
    }));
    Ok(())
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    table
}

fn check_mark(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn display_value(value: &str) -> String {
    if value.is_empty() || PLACEHOLDERS.contains(&value) {
        "<not set>".to_string()
    } else {
        value.to_string()
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || PLACEHOLDERS.contains(&s) {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("YOUR_API_KEY"), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("AIzaSyD-secret"), "AI***et");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value("YOUR_PROJECT_ID"), "<not set>");
        assert_eq!(display_value("immersion-d7"), "immersion-d7");
    }
}
