//! One-paragraph text summaries of successful tool results.
//!
//! A summary is the first text item of a successful result; the upstream body follows it
//! verbatim. Summaries read the body loosely, since Snappr has shipped both bare arrays and
//! `{"results": [...], "count", "total"}` envelopes, and both `id` and `booking_id`/`job_id`.

use serde_json::Value;
use std::fmt::Write as _;

/// Builds the summary line(s) from the call's arguments and the upstream JSON body.
pub type Summarize = fn(args: &Value, body: &Value) -> String;

const MAX_LISTED: usize = 10;

pub fn shoot_types(_args: &Value, body: &Value) -> String {
    type_listing("shoot types", body)
}

pub fn editing_job_types(_args: &Value, body: &Value) -> String {
    type_listing("editing job types", body)
}

pub fn coverage(args: &Value, body: &Value) -> String {
    let covered = ["coverage", "covered", "available"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_bool))
        .unwrap_or(false);
    let mut out = format!(
        "Coverage for '{}' at {}: {}",
        text(args, "shoot_type"),
        text(args, "address"),
        if covered { "Available" } else { "Not Available" },
    );
    if let (Some(lat), Some(lng)) = (body.get("latitude"), body.get("longitude")) {
        let _ = write!(out, " (coordinates {lat}, {lng})");
    }
    out
}

pub fn availability(args: &Value, body: &Value) -> String {
    let slots = items(body, &["slots", "available_slots", "results"]);
    let mut out = format!(
        "{} available slot(s) for '{}' in {}",
        slots.len(),
        text(args, "shoot_type"),
        text(args, "location"),
    );
    for slot in slots.iter().take(MAX_LISTED) {
        let when = match (slot.get("date"), slot.get("time")) {
            (Some(date), Some(time)) => format!("{} at {}", plain(date), plain(time)),
            _ => first_text(slot, &["start_time", "start", "date"]),
        };
        let _ = write!(out, "\n- {when}");
    }
    out
}

pub fn booking_created(_args: &Value, body: &Value) -> String {
    format!(
        "Booking {} created (status: {})",
        first_text(body, &["id", "booking_id"]),
        status(body, "pending"),
    )
}

pub fn bookings(_args: &Value, body: &Value) -> String {
    let bookings = items(body, &["results", "bookings"]);
    let total = body
        .get("total")
        .or_else(|| body.get("count"))
        .and_then(Value::as_u64)
        .map_or(bookings.len(), |n| usize::try_from(n).unwrap_or(usize::MAX));
    let mut out = format!("{} booking(s) returned (total: {total})", bookings.len());
    for booking in &bookings {
        let _ = write!(
            out,
            "\n- {} {} [{}]",
            first_text(booking, &["id", "booking_id"]),
            first_text(booking, &["shoot_type"]),
            status(booking, "unknown"),
        );
    }
    out
}

pub fn booking(args: &Value, body: &Value) -> String {
    let mut id = first_text(body, &["id", "booking_id"]);
    if id == "N/A" {
        id = text(args, "booking_id");
    }
    format!(
        "Booking {id}: {} at {}, scheduled {}, status {}",
        first_text(body, &["shoot_type"]),
        first_text(body, &["location"]),
        first_text(body, &["start_time", "scheduled_date"]),
        status(body, "unknown"),
    )
}

pub fn editing_job_created(_args: &Value, body: &Value) -> String {
    let mut out = format!(
        "Editing job {} created (status: {})",
        first_text(body, &["id", "job_id"]),
        status(body, "pending"),
    );
    if let Some(eta) = body.get("estimated_completion").filter(|v| !v.is_null()) {
        let _ = write!(out, ", estimated completion {}", plain(eta));
    }
    out
}

pub fn booking_media(args: &Value, body: &Value) -> String {
    let media = items(body, &["media", "results"]);
    let of_kind = |kinds: [&str; 2]| {
        media
            .iter()
            .filter(|m| m.get("type").and_then(Value::as_str).is_some_and(|t| kinds.contains(&t)))
            .collect::<Vec<_>>()
    };
    let photos = of_kind(["photo", "photos"]);
    let videos = of_kind(["video", "videos"]);

    let mut out = format!(
        "Media for booking {}: {} photo(s), {} video(s)",
        text(args, "booking_id"),
        photos.len(),
        videos.len(),
    );
    for (label, group) in [("Photos", &photos), ("Videos", &videos)] {
        if group.is_empty() {
            continue;
        }
        let _ = write!(out, "\n{label}:");
        for item in group {
            let _ = write!(out, "\n- {}", first_text(item, &["url", "filename"]));
        }
    }
    out
}

fn type_listing(what: &str, body: &Value) -> String {
    let types = items(body, &["results"]);
    let count = body
        .get("count")
        .and_then(Value::as_u64)
        .map_or(types.len(), |n| usize::try_from(n).unwrap_or(usize::MAX));
    let total = body
        .get("total")
        .and_then(Value::as_u64)
        .map_or(count, |n| usize::try_from(n).unwrap_or(usize::MAX));
    let mut out = format!("Found {count} of {total} {what}");
    for t in &types {
        let name = first_text(t, &["name"]);
        let display = t.get("display_name").map_or_else(|| name.clone(), plain);
        let _ = write!(out, "\n- {display} ({name})");
    }
    out
}

/// The list under the first present key, or the body itself when it is a bare array.
fn items(body: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(list) = body {
        return list.clone();
    }
    keys.iter()
        .find_map(|k| body.get(*k).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

fn status(v: &Value, fallback: &str) -> String {
    v.get("status")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn text(args: &Value, key: &str) -> String {
    args.get(key).map_or_else(|| "N/A".to_string(), plain)
}

fn first_text(v: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| v.get(*k).filter(|x| !x.is_null()))
        .map_or_else(|| "N/A".to_string(), plain)
}

fn plain(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
