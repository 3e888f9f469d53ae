use super::context::AppContext;
use super::prompts;
use super::sync::report_sync;
use super::sync_ui::SyncSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use immersion_models::SyncStatus;
use immersion_sources::{create_auth_client, FirebaseAuthClient};
use serde_json::json;

const MIN_PASSWORD_LEN: usize = 6;

fn auth_client(ctx: &AppContext) -> Result<FirebaseAuthClient> {
    create_auth_client(&ctx.config).map_err(|e| eyre!("{}", e))
}

pub async fn run_login(email: Option<String>, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let auth = auth_client(&ctx)?;
    // Start signed out so every login is a sign-in transition and merges
    let mut tracker = ctx.tracker()?;

    let email = prompts::prompt_email(email)?;
    let password = prompts::prompt_password("Password")?;
    let identity = auth.sign_in(&email, &password).await.map_err(|e| eyre!("{}", e))?;

    ctx.credentials.set_identity(&identity);
    ctx.save_credentials()?;
    output.success(format!(
        "Signed in as {}",
        identity.display_name.as_deref().unwrap_or(&identity.email)
    ));

    let spinner = tracker.has_remote().then(|| SyncSpinner::start(output.is_quiet() || !output.is_human()));
    let reconciliation = tracker.sign_in(identity).await;
    let Some(result) = reconciliation else {
        if let Some(spinner) = spinner {
            spinner.finish(SyncStatus::Succeeded);
        }
        output.json(&json!({ "success": true, "reconciled": false }));
        return Ok(());
    };

    let status = if result.is_ok() { SyncStatus::Succeeded } else { SyncStatus::Failed };
    if let Some(spinner) = spinner {
        spinner.finish(status);
    }
    match result {
        Ok(outcome) => {
            ctx.record_sync()?;
            report_sync(&outcome, output);
        }
        // Sign-in itself succeeded; `login` and `sync` both merge before pushing
        Err(e) => {
            output.warn(format!("{} ({})", SyncStatus::Failed.message(), e));
            output.info("Run `immersion sync` to merge with your cloud videos again.");
            output.json(&json!({ "success": true, "reconciled": false, "error": e.to_string() }));
        }
    }
    Ok(())
}

pub async fn run_signup(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let auth = auth_client(&ctx)?;

    let display_name = prompts::prompt_string("Display name", None)?;
    let email = prompts::prompt_email(None)?;
    let password = prompts::prompt_password("Password")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(eyre!("Password should be at least 6 characters."));
    }
    if prompts::prompt_password("Confirm password")? != password {
        return Err(eyre!("Passwords do not match."));
    }

    auth.sign_up(&email, &password, &display_name)
        .await
        .map_err(|e| eyre!("{}", e))?;
    output.success("Account created. Please check your email to verify your account, then run `immersion login`.");
    output.json(&json!({ "success": true, "email": email }));
    Ok(())
}

pub async fn run_logout(output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let Some(identity) = ctx.credentials.get_identity() else {
        output.info("Not signed in");
        return Ok(());
    };

    ctx.credentials.clear_identity();
    ctx.save_credentials()?;
    output.success(format!("Signed out {}. Your videos stay on this machine.", identity.email));
    output.json(&json!({ "success": true }));
    Ok(())
}

pub async fn run_reset_password(email: Option<String>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let auth = auth_client(&ctx)?;
    let email = prompts::prompt_email(email)?;

    auth.send_password_reset(&email).await.map_err(|e| eyre!("{}", e))?;
    output.success("Password reset email sent. Check your inbox.");
    output.json(&json!({ "success": true, "email": email }));
    Ok(())
}
