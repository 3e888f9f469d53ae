use immersion_models::VideoRecord;
use std::cmp::Ordering;

/// Newest first; records without a timestamp go after every timestamped one
pub fn recency_order(a: &VideoRecord, b: &VideoRecord) -> Ordering {
    match (a.sort_timestamp, b.sort_timestamp) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, so ties keep their relative order
pub fn sort_by_recency(videos: &mut [VideoRecord]) {
    videos.sort_by(recency_order);
}
