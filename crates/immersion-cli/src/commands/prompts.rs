use color_eyre::Result;
use dialoguer::{Confirm, Input};

/// Prompt for a non-empty string, with an optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default_value) = default {
        input = input.default(default_value.to_string());
    }
    input
        .interact_text()
        .map(|value| value.trim().to_string())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

pub fn prompt_email(existing: Option<String>) -> Result<String> {
    if let Some(email) = existing {
        return Ok(email.trim().to_string());
    }
    loop {
        let email = prompt_string("Email", None)?;
        if looks_like_email(&email) {
            return Ok(email);
        }
        eprintln!("Invalid email address.");
    }
}

/// Masked password input
pub fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt))
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))
}

pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("learner@example.com"));
        assert!(!looks_like_email("learner"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("learner@example."));
    }
}
