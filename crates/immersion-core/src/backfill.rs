//! Timestamp repair for records written before timestamps existed.
//!
//! These heuristics are best-effort: legacy ids that were not time-prefixed
//! decode to garbage or nothing, and those records may end up misordered.

use immersion_models::VideoRecord;
use crate::ids::{base36_prefix_mod, decode_base36_prefix};

const UPLOAD_STAMP_MODULUS: i64 = 1_000_000;
/// Base-36 width of a millisecond clock between 1973 and 2059
const LEGACY_TIME_DIGITS: usize = 8;
const POSITION_STEP_MILLIS: i64 = 1000;

/// Creation time recovered from a time-prefixed id, or `now` when it cannot be
///
/// Current ids separate the time with `-`. Legacy ids glue the clock directly to
/// the random part, so only their first eight characters are the time.
pub fn timestamp_from_unique_id(unique_id: &str, now_millis: i64) -> i64 {
    let time_segment = match unique_id.split_once('-') {
        Some((time, _)) => time,
        None => unique_id.get(..LEGACY_TIME_DIGITS).unwrap_or(unique_id),
    };
    decode_base36_prefix(time_segment)
        .filter(|millis| *millis > 0)
        .unwrap_or(now_millis)
}

/// Fill missing timestamps from the id time prefix. Returns how many were filled.
pub fn backfill_from_unique_ids(videos: &mut [VideoRecord], now_millis: i64) -> usize {
    let mut filled = 0;
    for video in videos.iter_mut().filter(|v| !v.has_timestamp()) {
        video.sort_timestamp = Some(timestamp_from_unique_id(&video.unique_id, now_millis));
        filled += 1;
    }
    filled
}

/// Stamp records still missing a timestamp right before a full upload.
///
/// Each gets `now` minus a per-id offset below one million milliseconds, so the
/// stamped records stay near the top but do not all share one value.
pub fn stamp_for_upload(videos: &mut [VideoRecord], now_millis: i64) -> usize {
    let mut stamped = 0;
    for video in videos.iter_mut().filter(|v| !v.has_timestamp()) {
        let offset = base36_prefix_mod(&video.unique_id, UPLOAD_STAMP_MODULUS);
        video.sort_timestamp = Some(now_millis - offset);
        stamped += 1;
    }
    stamped
}

/// Fill missing timestamps one second apart by list position (top is newest)
pub fn backfill_by_position(videos: &mut [VideoRecord], now_millis: i64) -> usize {
    let mut filled = 0;
    for (index, video) in videos.iter_mut().enumerate() {
        if !video.has_timestamp() {
            video.sort_timestamp = Some(now_millis - index as i64 * POSITION_STEP_MILLIS);
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::generate_unique_id;

    const NOW: i64 = 1_720_000_000_000;

    fn record(unique_id: &str, timestamp: Option<i64>) -> VideoRecord {
        VideoRecord {
            external_id: "dQw4w9WgXcQ".to_string(),
            unique_id: unique_id.to_string(),
            title: "t".to_string(),
            thumbnail_url: String::new(),
            duration_seconds: 1,
            source_url: None,
            created_at_iso: None,
            sort_timestamp: timestamp,
        }
    }

    #[test]
    fn test_generated_ids_backfill_to_their_creation_time() {
        let created = 1_700_000_000_000;
        let id = generate_unique_id(created);
        assert_eq!(timestamp_from_unique_id(&id, NOW), created);
    }

    #[test]
    fn test_undecodable_ids_fall_back_to_now() {
        assert_eq!(timestamp_from_unique_id("", NOW), NOW);
        assert_eq!(timestamp_from_unique_id("0-abc", NOW), NOW);
        assert_eq!(timestamp_from_unique_id("-abc", NOW), NOW);
        assert_eq!(timestamp_from_unique_id("!legacy", NOW), NOW);
    }

    #[test]
    fn test_legacy_ids_without_separator_recover_their_time() {
        let created = 1_700_000_000_000;
        let legacy = format!("{}{}", crate::ids::to_base36(created as u64), "k3j9x2m1q");
        assert_eq!(legacy.len(), 17);
        assert_eq!(timestamp_from_unique_id(&legacy, NOW), created);

        let mut videos = vec![record(&legacy, None)];
        backfill_from_unique_ids(&mut videos, NOW);
        assert_eq!(videos[0].sort_timestamp, Some(created));
    }

    #[test]
    fn test_backfill_leaves_existing_timestamps() {
        let mut videos = vec![record("10-a", Some(5)), record("10-b", None)];
        assert_eq!(backfill_from_unique_ids(&mut videos, NOW), 1);
        assert_eq!(videos[0].sort_timestamp, Some(5));
        assert_eq!(videos[1].sort_timestamp, Some(36));
    }

    #[test]
    fn test_stamp_for_upload_stays_within_a_million_ms_of_now() {
        let mut videos = vec![record(&generate_unique_id(NOW), None), record("x", Some(1))];
        assert_eq!(stamp_for_upload(&mut videos, NOW), 1);
        let stamped = videos[0].sort_timestamp.unwrap();
        assert!(stamped <= NOW && stamped > NOW - 1_000_000);
        assert_eq!(videos[1].sort_timestamp, Some(1));
    }

    #[test]
    fn test_backfill_by_position() {
        let mut videos = vec![record("a", None), record("b", Some(7)), record("c", None)];
        assert_eq!(backfill_by_position(&mut videos, NOW), 2);
        assert_eq!(videos[0].sort_timestamp, Some(NOW));
        assert_eq!(videos[1].sort_timestamp, Some(7));
        assert_eq!(videos[2].sort_timestamp, Some(NOW - 2000));
    }
}
