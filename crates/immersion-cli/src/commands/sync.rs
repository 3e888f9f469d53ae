use super::context::AppContext;
use super::sync_ui::SyncSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use immersion_core::ReconcileOutcome;
use immersion_models::SyncStatus;
use serde_json::json;

pub async fn run_sync(output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");
    let mut ctx = AppContext::load()?;
    let mut tracker = ctx.signed_in_tracker(output).await?;

    if !tracker.has_remote() {
        return Err(eyre!(
            "Cloud sync is not configured. Run: immersion config set firebase.api_key <KEY> and firebase.project_id <ID>"
        ));
    }
    if !tracker.session().is_signed_in() {
        return Err(eyre!("Not signed in. Run: immersion login"));
    }

    let spinner = SyncSpinner::start(output.is_quiet() || !output.is_human());
    let result = tracker.sync_to_cloud().await;
    let status = if result.is_ok() { SyncStatus::Succeeded } else { SyncStatus::Failed };
    spinner.finish(status);

    match result {
        Ok(outcome) => {
            ctx.record_sync()?;
            report_sync(&outcome, output);
            Ok(())
        }
        Err(e) => {
            output.error(SyncStatus::Failed.message());
            Err(eyre!("Sync failed: {}", e))
        }
    }
}

/// Shared by `sync` and the reconciliation that follows `login`
pub fn report_sync(outcome: &ReconcileOutcome, output: &Output) {
    output.success(SyncStatus::Succeeded.message());
    output.info(format!(
        "{} videos in your collection ({} from the cloud, {} uploaded from this machine)",
        outcome.total, outcome.remote_count, outcome.local_only
    ));
    output.json(&json!({ "success": true, "sync": outcome }));
}
