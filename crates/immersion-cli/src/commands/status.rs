use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use immersion_core::format::format_hours_minutes;
use immersion_core::Dashboard;
use owo_colors::OwoColorize;
use serde_json::json;

const BAR_WIDTH: usize = 30;

pub async fn run_status(output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let tracker = ctx.signed_in_tracker(output).await?;
    let dashboard = tracker.dashboard();
    let account = tracker.session().identity().map(|identity| {
        identity
            .display_name
            .clone()
            .unwrap_or_else(|| identity.email.clone())
    });
    let last_sync = ctx.credentials.get_last_sync();

    if !output.is_human() {
        output.json(&json!({
            "dashboard": dashboard,
            "signed_in_as": account,
            "cloud_sync": tracker.has_remote(),
            "last_sync": last_sync.map(|t| t.to_rfc3339()),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    print_dashboard(&dashboard);
    println!();
    match account {
        Some(name) => println!("Signed in as {}", name.bright_cyan()),
        None if tracker.has_remote() => println!("{}", "Not signed in. Run `immersion login` to sync.".bright_black()),
        None => println!("{}", "Cloud sync is not configured.".bright_black()),
    }
    if let Some(last_sync) = last_sync {
        println!("Last synced {}", last_sync.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let progress = &dashboard.progress;
    let (r, g, b) = hex_rgb(progress.level.color).unwrap_or((255, 255, 255));

    println!(
        "{} {}",
        "Total immersion:".bold(),
        format_hours_minutes(dashboard.total_seconds)
    );
    println!("{} {}", "Videos watched:".bold(), dashboard.video_count);
    println!(
        "{} {}",
        "Level:".bold(),
        progress.level.name.truecolor(r, g, b).bold()
    );

    let filled = usize::from(progress.percent) * BAR_WIDTH / 100;
    println!(
        "[{}{}] {}%",
        "█".repeat(filled).truecolor(r, g, b),
        "░".repeat(BAR_WIDTH - filled).bright_black(),
        progress.percent
    );
    if progress.is_max_level {
        println!("{}", "Max Level".truecolor(r, g, b));
    } else {
        println!(
            "{:.1} hours to the next level (at {} h)",
            progress.hours_to_next, progress.level.end
        );
    }
}

/// `#RRGGBB` to an RGB triple
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#FFC107"), Some((255, 193, 7)));
        assert_eq!(hex_rgb("#4CAF50"), Some((76, 175, 80)));
        assert_eq!(hex_rgb("FFC107"), None);
        assert_eq!(hex_rgb("#FFF"), None);
    }
}
