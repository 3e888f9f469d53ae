use super::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Attribute, Cell, CellAlignment, Table};
use immersion_core::{format_duration, TrackerError};
use serde_json::json;

pub async fn run_add(url: &str, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    if !ctx.config.is_youtube_configured() {
        return Err(eyre!(
            "YouTube API key is not configured. Run: immersion config set youtube.api_key <KEY>"
        ));
    }
    let mut tracker = ctx.signed_in_tracker(output).await?;

    let outcome = match tracker.add_video(url).await {
        Ok(outcome) => outcome,
        Err(TrackerError::InvalidVideoReference(_)) => {
            return Err(eyre!("Please enter a valid YouTube URL"));
        }
        Err(e) => return Err(eyre!("Failed to add video: {}", e)),
    };

    if let Some(remote_error) = &outcome.remote_error {
        output.warn(format!("Saved on this machine, but not to the cloud: {}", remote_error));
    }
    output.success(format!(
        "Added \"{}\" ({})",
        outcome.record.title,
        format_duration(outcome.record.duration_seconds)
    ));
    output.json(&json!({
        "success": true,
        "video": outcome.record,
        "remote_error": outcome.remote_error,
        "total_seconds": tracker.store().total(),
    }));
    Ok(())
}

pub async fn run_remove(unique_id: &str, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let mut tracker = ctx.signed_in_tracker(output).await?;

    let outcome = tracker
        .delete_video(unique_id)
        .await
        .map_err(|e| eyre!("Failed to remove video: {}", e))?;

    if let Some(remote_error) = &outcome.remote_error {
        output.warn(format!("Removed on this machine, but not from the cloud: {}", remote_error));
    }
    if outcome.removed {
        output.success(format!("Removed {}", unique_id));
    } else {
        output.info(format!("No video with id {}", unique_id));
    }
    output.json(&json!({
        "success": true,
        "removed": outcome.removed,
        "remote_error": outcome.remote_error,
    }));
    Ok(())
}

pub async fn run_list(limit: Option<usize>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let tracker = ctx.tracker()?;
    let videos = tracker.store().videos();
    let shown = &videos[..limit.unwrap_or(videos.len()).min(videos.len())];

    if !output.is_human() {
        output.json(&json!({ "count": videos.len(), "videos": shown }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }
    if videos.is_empty() {
        output.info("No videos yet. Add one with: immersion add <youtube-url>");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Duration").add_attribute(Attribute::Bold),
        Cell::new("Added").add_attribute(Attribute::Bold),
        Cell::new("Id").add_attribute(Attribute::Bold),
    ]);
    for (index, video) in shown.iter().enumerate() {
        let added = video
            .created_at_iso
            .as_deref()
            .and_then(|iso| iso.get(..10))
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&video.title),
            Cell::new(format_duration(video.duration_seconds)).set_alignment(CellAlignment::Right),
            Cell::new(added),
            Cell::new(&video.unique_id),
        ]);
    }
    println!("{}", table);
    if shown.len() < videos.len() {
        output.info(format!("Showing {} of {} videos", shown.len(), videos.len()));
    }
    Ok(())
}
