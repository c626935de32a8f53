//! The Snappr tool catalog.
//!
//! Upstream paths and field names follow the Snappr API (`https://docs.snappr.com/`); note the
//! coverage endpoint spells the shoot type as `shoottype`, and bookings nest the contact details.

use crate::schema::{ParamType, ToolDescriptor, ToolParam};
use crate::semantics::HttpMethod;
use crate::summary;
use serde_json::json;

pub const LIST_SHOOT_TYPES: &str = "list_shoot_types";
pub const LIST_EDITING_JOB_TYPES: &str = "list_editing_job_types";
pub const CHECK_COVERAGE: &str = "check_coverage";
pub const FIND_AVAILABILITY: &str = "find_availability";
pub const CREATE_BOOKING: &str = "create_booking";
pub const LIST_BOOKINGS: &str = "list_bookings";
pub const GET_BOOKING: &str = "get_booking";
pub const CREATE_EDITING_JOB: &str = "create_editing_job";
pub const GET_BOOKING_MEDIA: &str = "get_booking_media";

pub const MEDIA_TYPES: &[&str] = &["photos", "videos", "all"];

/// All nine Snappr tools, in the order they are advertised.
#[must_use]
pub fn snappr_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            LIST_SHOOT_TYPES,
            HttpMethod::Get,
            "shoottypes",
            "Get available photography shoot types. Use the returned `name` values as `shoot_type` when checking coverage or booking.",
        )
        .summarized(summary::shoot_types),
        ToolDescriptor::new(
            LIST_EDITING_JOB_TYPES,
            HttpMethod::Get,
            "editing-job-types",
            "Get available photo editing job types. Use the returned `name` values as `editing_type` when creating editing jobs.",
        )
        .summarized(summary::editing_job_types),
        check_coverage(),
        find_availability(),
        create_booking(),
        list_bookings(),
        ToolDescriptor::new(
            GET_BOOKING,
            HttpMethod::Get,
            "bookings/{booking_id}",
            "Get detailed information about a specific booking",
        )
        .param(ToolParam::path("booking_id", "The unique booking identifier"))
        .summarized(summary::booking),
        create_editing_job(),
        get_booking_media(),
    ]
}

fn check_coverage() -> ToolDescriptor {
    ToolDescriptor::new(
        CHECK_COVERAGE,
        HttpMethod::Get,
        "coverage",
        "Check if Snappr photography services are available in a specific location for a shoot type",
    )
    .param(
        ToolParam::query(
            "address",
            ParamType::String,
            "Address of the shoot location. Must be a Google Maps valid address.",
        )
        .required(),
    )
    .param(
        ToolParam::query(
            "shoot_type",
            ParamType::String,
            "Type of photoshoot (use list_shoot_types to see available options)",
        )
        .upstream("shoottype")
        .required(),
    )
    .param(
        ToolParam::query(
            "latitude",
            ParamType::Number,
            "Optional latitude coordinate (requires longitude)",
        )
        .range(Some(-90), Some(90)),
    )
    .param(
        ToolParam::query(
            "longitude",
            ParamType::Number,
            "Optional longitude coordinate (requires latitude)",
        )
        .range(Some(-180), Some(180)),
    )
    .paired("latitude", "longitude")
    .summarized(summary::coverage)
}

fn find_availability() -> ToolDescriptor {
    ToolDescriptor::new(
        FIND_AVAILABILITY,
        HttpMethod::Get,
        "availability",
        "Find available time slots for photography bookings",
    )
    .param(
        ToolParam::query("location", ParamType::String, "Location for the photoshoot").required(),
    )
    .param(
        ToolParam::query(
            "shoot_type",
            ParamType::String,
            "Type of photoshoot (e.g., 'headshots', 'event', 'product')",
        )
        .required(),
    )
    .param(
        ToolParam::query(
            "date_from",
            ParamType::String,
            "Start date for availability search (YYYY-MM-DD)",
        )
        .required(),
    )
    .param(
        ToolParam::query(
            "date_to",
            ParamType::String,
            "End date for availability search (YYYY-MM-DD)",
        )
        .required(),
    )
    .param(
        ToolParam::query("duration", ParamType::Integer, "Shoot duration in minutes")
            .range(Some(1), None),
    )
    .summarized(summary::availability)
}

fn create_booking() -> ToolDescriptor {
    ToolDescriptor::new(
        CREATE_BOOKING,
        HttpMethod::Post,
        "bookings",
        "Create a new photography booking. Each call creates a distinct booking.",
    )
    .param(ToolParam::body("shoot_type", ParamType::String, "Type of photoshoot").required())
    .param(ToolParam::body("location", ParamType::String, "Shoot location address").required())
    .param(
        ToolParam::body(
            "start_time",
            ParamType::String,
            "Booking start time (ISO 8601 format)",
        )
        .required(),
    )
    .param(
        ToolParam::body("duration", ParamType::Integer, "Duration in minutes")
            .range(Some(1), None)
            .required(),
    )
    .param(
        ToolParam::body("contact_name", ParamType::String, "Primary contact name")
            .upstream("contact.name")
            .required(),
    )
    .param(
        ToolParam::body("contact_email", ParamType::String, "Primary contact email")
            .upstream("contact.email")
            .required(),
    )
    .param(
        ToolParam::body(
            "contact_phone",
            ParamType::String,
            "Primary contact phone number",
        )
        .upstream("contact.phone")
        .default_value(json!("")),
    )
    .param(ToolParam::body(
        "notes",
        ParamType::String,
        "Additional notes or requirements",
    ))
    .summarized(summary::booking_created)
}

fn list_bookings() -> ToolDescriptor {
    ToolDescriptor::new(
        LIST_BOOKINGS,
        HttpMethod::Get,
        "bookings",
        "List photography bookings with optional filtering. Paginate with limit/offset.",
    )
    .param(ToolParam::query(
        "status",
        ParamType::String,
        "Filter by booking status",
    ))
    .param(
        ToolParam::query(
            "limit",
            ParamType::Integer,
            "Maximum number of results to return",
        )
        .range(Some(1), None),
    )
    .param(
        ToolParam::query("offset", ParamType::Integer, "Number of results to skip")
            .range(Some(0), None),
    )
    .summarized(summary::bookings)
}

fn create_editing_job() -> ToolDescriptor {
    ToolDescriptor::new(
        CREATE_EDITING_JOB,
        HttpMethod::Post,
        "editing-jobs",
        "Create a photo editing job",
    )
    .param(
        ToolParam::body(
            "editing_type",
            ParamType::String,
            "Type of editing (use list_editing_job_types to see available options)",
        )
        .required(),
    )
    .param(ToolParam::body(
        "booking_id",
        ParamType::String,
        "Booking ID to edit photos from",
    ))
    .param(ToolParam::body(
        "instructions",
        ParamType::String,
        "Specific editing instructions",
    ))
    .param(ToolParam::body(
        "image_urls",
        ParamType::StringArray,
        "URLs of images to edit",
    ))
    .summarized(summary::editing_job_created)
}

fn get_booking_media() -> ToolDescriptor {
    ToolDescriptor::new(
        GET_BOOKING_MEDIA,
        HttpMethod::Get,
        "bookings/{booking_id}/media",
        "Retrieve media (photos/videos) from a completed booking",
    )
    .param(ToolParam::path("booking_id", "The booking ID to get media from"))
    .param(
        ToolParam::query(
            "media_type",
            ParamType::String,
            "Type of media to retrieve ('photos', 'videos', 'all')",
        )
        .upstream("type")
        .one_of(MEDIA_TYPES)
        .default_value(json!("all"))
        .omit_when("all"),
    )
    .summarized(summary::booking_media)
}
