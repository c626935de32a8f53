use serde_json::{Value, json};
use snappr_mcp_tools::config::{ApiKey, parse_base_url};
use snappr_mcp_tools::{SnapprConfig, SnapprError, SnapprGateway, UpstreamResponse};
use snappr_test_support::MockSnappr;
use std::time::Duration;

const API_KEY: &str = "sk_test_gateway";

fn gateway_for(mock: &MockSnappr, timeout: Option<Duration>) -> SnapprGateway {
    let cfg = SnapprConfig::new(
        ApiKey::parse(API_KEY).expect("key"),
        parse_base_url(&mock.base_url()).expect("base url"),
    )
    .with_timeout(timeout);
    SnapprGateway::new(&cfg).expect("gateway")
}

fn structured(result: &rmcp::model::CallToolResult) -> Value {
    result.structured_content.clone().unwrap_or(Value::Null)
}

#[tokio::test]
async fn dispatch_returns_parsed_upstream_json() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    let gateway = gateway_for(&mock, None);

    let resp = gateway.dispatch("list_shoot_types", &Value::Null).await?;
    let UpstreamResponse::Json(body) = &resp else {
        anyhow::bail!("expected JSON response, got {resp:?}");
    };
    assert_eq!(body[0]["name"], json!("headshots"));
    Ok(())
}

#[tokio::test]
async fn success_result_carries_text_and_structured_body() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    let gateway = gateway_for(&mock, None);

    let result = gateway
        .call_tool(
            "check_coverage",
            json!({"address": "1 Main St", "shoot_type": "food"}),
        )
        .await?;
    assert_eq!(result.is_error, Some(false));
    assert_eq!(structured(&result)["body"]["covered"], json!(true));

    let content = serde_json::to_value(&result)?["content"].clone();
    assert_eq!(
        content[0]["text"],
        json!("Coverage for 'food' at 1 Main St: Available")
    );
    let parsed: Value = serde_json::from_str(content[1]["text"].as_str().unwrap_or_default())?;
    assert_eq!(parsed["shoottype"], json!("food"));
    Ok(())
}

fn summary(result: &rmcp::model::CallToolResult) -> String {
    serde_json::to_value(result).unwrap_or_default()["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn each_tool_leads_with_a_summary() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    let gateway = gateway_for(&mock, None);

    let result = gateway.call_tool("list_shoot_types", json!({})).await?;
    let text = summary(&result);
    assert!(text.starts_with("Found 3 of 3 shoot types"), "{text}");
    assert!(text.contains("- Real Estate (real-estate)"), "{text}");

    let result = gateway.call_tool("list_editing_job_types", json!({})).await?;
    assert!(summary(&result).starts_with("Found 2 of 2 editing job types"));

    let result = gateway
        .call_tool(
            "find_availability",
            json!({
                "location": "Austin",
                "shoot_type": "food",
                "date_from": "2026-11-02",
                "date_to": "2026-11-03",
            }),
        )
        .await?;
    let text = summary(&result);
    assert!(text.starts_with("2 available slot(s) for 'food' in Austin"), "{text}");
    assert!(text.contains("- 2026-11-02T09:00:00Z"), "{text}");

    let result = gateway
        .call_tool(
            "create_booking",
            json!({
                "shoot_type": "food",
                "location": "1 Main St",
                "start_time": "2026-11-02T10:00:00Z",
                "duration": 60,
                "contact_name": "Sam Lee",
                "contact_email": "sam@example.com",
            }),
        )
        .await?;
    assert_eq!(summary(&result), "Booking bk_000001 created (status: pending)");
    assert_eq!(structured(&result)["body"]["id"], json!("bk_000001"));

    let result = gateway.call_tool("list_bookings", json!({})).await?;
    assert_eq!(
        summary(&result),
        "1 booking(s) returned (total: 1)\n- bk_000001 food [pending]"
    );

    let result = gateway
        .call_tool("get_booking", json!({"booking_id": "bk_000001"}))
        .await?;
    assert_eq!(
        summary(&result),
        "Booking bk_000001: food at 1 Main St, scheduled 2026-11-02T10:00:00Z, status pending"
    );

    let result = gateway
        .call_tool("get_booking_media", json!({"booking_id": "bk_000001"}))
        .await?;
    let text = summary(&result);
    assert!(
        text.starts_with("Media for booking bk_000001: 1 photo(s), 1 video(s)"),
        "{text}"
    );
    assert!(text.contains("https://media.example.com/bk_000001/1.mp4"), "{text}");
    assert_eq!(
        structured(&result)["body"]["media"].as_array().map(Vec::len),
        Some(2)
    );

    let result = gateway
        .call_tool("create_editing_job", json!({"editing_type": "basic-retouch"}))
        .await?;
    assert_eq!(summary(&result), "Editing job ej_000001 created (status: queued)");
    Ok(())
}

#[tokio::test]
async fn list_bookings_paginates_upstream_results() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    let gateway = gateway_for(&mock, None);

    for _ in 0..3 {
        gateway
            .call_tool(
                "create_booking",
                json!({
                    "shoot_type": "food",
                    "location": "1 Main St",
                    "start_time": "2026-11-02T10:00:00Z",
                    "duration": 30,
                    "contact_name": "Sam Lee",
                    "contact_email": "sam@example.com",
                    "contact_phone": "+1 512 555 0100",
                }),
            )
            .await?;
    }

    let result = gateway
        .call_tool("list_bookings", json!({"limit": "2", "offset": 1}))
        .await?;
    let body = structured(&result)["body"].clone();
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["results"][0]["id"], json!("bk_000002"));
    assert_eq!(
        body["results"][0]["contact"]["phone"],
        json!("+1 512 555 0100")
    );
    Ok(())
}

#[tokio::test]
async fn upstream_error_body_is_passed_through_verbatim() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    mock.respond_with(
        "POST",
        "bookings",
        422,
        json!({"error": "invalid_start_time", "message": "start_time is in the past"}),
    );
    let gateway = gateway_for(&mock, None);

    let err = gateway
        .dispatch(
            "create_booking",
            &json!({
                "shoot_type": "food",
                "location": "1 Main St",
                "start_time": "2020-01-01T10:00:00Z",
                "duration": 30,
                "contact_name": "Sam Lee",
                "contact_email": "sam@example.com",
            }),
        )
        .await
        .unwrap_err();
    match err {
        SnapprError::Upstream { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body["error"], json!("invalid_start_time"));
        }
        other => anyhow::bail!("expected upstream error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn slow_upstream_times_out_as_transport_error() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    mock.delay("GET", "shoottypes", Duration::from_secs(2));
    let gateway = gateway_for(&mock, Some(Duration::from_millis(200)));

    let result = gateway.call_tool("list_shoot_types", json!({})).await?;
    assert_eq!(result.is_error, Some(true));
    let payload = structured(&result);
    assert_eq!(payload["kind"], json!("transport"));
    assert_eq!(payload["status"], Value::Null);
    assert!(
        payload["message"]
            .as_str()
            .unwrap_or_default()
            .contains("timed out")
    );
    Ok(())
}

#[tokio::test]
async fn validation_errors_list_every_violation() -> anyhow::Result<()> {
    let mock = MockSnappr::start(API_KEY).await?;
    let gateway = gateway_for(&mock, None);

    let result = gateway
        .call_tool(
            "check_coverage",
            json!({"address": "1 Main St", "latitude": 100, "extra": true}),
        )
        .await?;
    assert_eq!(result.is_error, Some(true));
    let violations = structured(&result)["details"]["violations"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let kinds: Vec<&str> = violations
        .iter()
        .filter_map(|v| v["type"].as_str())
        .collect();
    assert!(kinds.contains(&"invalid-parameter"), "{kinds:?}");
    assert!(kinds.contains(&"missing-required-parameter"), "{kinds:?}");
    assert!(kinds.contains(&"missing-paired-parameter"), "{kinds:?}");
    assert!(kinds.contains(&"constraint-violation"), "{kinds:?}");
    assert_eq!(mock.request_count(), 0);
    Ok(())
}
