use once_cell::sync::Lazy;
use regex::Regex;
use crate::error::SourceError;

/// watch?v=, /v/, /e/, /embed/, /<x>/<y>/ and youtu.be/ forms
static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#)
        .expect("video url pattern is valid")
});

/// ISO-8601 period as returned by the Data API. Days appear on very long streams.
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is valid")
});

/// Pull the 11-character video id out of a pasted YouTube URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_URL
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse `PT#H#M#S` (any component optional, plus an optional leading `#D`) into whole seconds
///
/// A bare `P` carries neither a day count nor a time part and is rejected.
pub fn parse_iso8601_duration(duration: &str) -> Result<u64, SourceError> {
    let invalid = || SourceError::InvalidDuration(duration.to_string());
    let trimmed = duration.trim();
    if trimmed == "P" {
        return Err(invalid());
    }
    let caps = DURATION.captures(trimmed).ok_or_else(invalid)?;

    let component = |index: usize| -> Result<u64, SourceError> {
        match caps.get(index) {
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .map_err(|_| invalid()),
            None => Ok(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;
    let seconds = component(4)?;

    [(days, 86_400u64), (hours, 3_600), (minutes, 60), (seconds, 1)]
        .into_iter()
        .try_fold(0u64, |total, (count, unit)| count.checked_mul(unit)?.checked_add(total))
        .ok_or_else(invalid)
}
