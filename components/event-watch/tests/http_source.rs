mod common;

use chrono::{TimeZone, Utc};
use common::{ACCOUNT_SID, AUTH_TOKEN, BASIC_AUTH, MockPlatform, empty_page};
use event_watch::{
    helpers::load_config::{AccountConfig, ApiConfig},
    source::{
        http::HttpEventSource,
        source::{EventFilter, EventSource, LogLevel, SourceError},
    },
};
use hyper::http::StatusCode;

fn source_for(platform: &MockPlatform, max_pages: u32) -> HttpEventSource {
    let account = AccountConfig {
        sid: Some(ACCOUNT_SID.into()),
        auth_token: Some(AUTH_TOKEN.into()),
    };
    let api = ApiConfig {
        base_url: platform.base_url(),
        monitor_base_url: platform.base_url(),
        max_pages,
        ..ApiConfig::default()
    };
    HttpEventSource::new(&account, &api).unwrap()
}

fn filter() -> EventFilter {
    EventFilter {
        start_date: Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap(),
        end_date: Some(Utc.with_ymd_and_hms(2026, 10, 14, 13, 0, 0).unwrap()),
        log_level: None,
    }
}

#[tokio::test]
async fn alerts_follow_absolute_next_page_links() {
    let platform = MockPlatform::start(|req| {
        let body = if req.query.contains("Page=1") {
            r#"{"alerts": [{"sid": "NO2", "date_created": "2026-10-14T12:00:01Z",
                "log_level": "error", "error_code": 11200, "alert_text": "Msg=second"}],
                "meta": {"next_page_url": null}}"#
                .to_string()
        } else {
            format!(
                r#"{{"alerts": [{{"sid": "NO1", "date_created": "2026-10-14T12:00:02Z",
                    "log_level": "error", "error_code": "11200", "alert_text": "Msg=first"}}],
                    "meta": {{"next_page_url": "http://{}/v1/Alerts?Page=1&PageToken=PA1"}}}}"#,
                req.host
            )
        };
        (StatusCode::OK, body)
    })
    .await;

    let source = source_for(&platform, 20);
    let mut filter = filter();
    filter.log_level = Some(LogLevel::Error);

    let alerts = source.list_alerts(&filter).await.unwrap();
    let sids: Vec<&str> = alerts.iter().map(|a| a.sid.as_str()).collect();
    assert_eq!(sids, ["NO1", "NO2"]);
    assert_eq!(alerts[1].error_code, "11200");

    let requests = platform.requests_to("/v1/Alerts");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].authorization.as_deref(), Some(BASIC_AUTH));
    assert!(requests[0].query.contains("StartDate=2026-10-14T12%3A00%3A00Z"));
    assert!(requests[0].query.contains("EndDate=2026-10-14T13%3A00%3A00Z"));
    assert!(requests[0].query.contains("LogLevel=error"));
    assert!(requests[0].query.contains("PageSize=50"));
}

#[tokio::test]
async fn messages_follow_relative_next_page_uris() {
    let platform = MockPlatform::start(|req| {
        let body = if req.query.contains("Page=1") {
            r#"{"messages": [{"sid": "SM2", "date_updated": "Wed, 14 Oct 2026 12:00:00 +0000",
                "direction": "inbound", "status": "received", "body": "hi",
                "from": "+15551234567", "to": "+15557654321"}], "next_page_uri": null}"#
        } else {
            r#"{"messages": [{"sid": "SM1", "date_updated": "Wed, 14 Oct 2026 12:00:05 +0000",
                "direction": "outbound-api", "status": "sent", "body": null,
                "from": "+15557654321", "to": "+15551234567"}],
                "next_page_uri": "/2010-04-01/Accounts/AC123/Messages.json?Page=1&PageToken=PA1"}"#
        };
        (StatusCode::OK, body.to_string())
    })
    .await;

    let source = source_for(&platform, 20);
    let messages = source.list_messages(&filter()).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "");
    assert_eq!(
        messages[1].date_updated,
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    );

    let requests = platform.requests_to("/2010-04-01/Accounts/AC123/Messages.json");
    assert_eq!(requests.len(), 2);
    assert!(requests[0].query.contains("DateSent%3E=2026-10-14T12%3A00%3A00Z"));
    assert!(requests[0].query.contains("DateSent%3C=2026-10-14T13%3A00%3A00Z"));
}

#[tokio::test]
async fn calls_query_by_start_time_without_end_when_open_ended() {
    let platform = MockPlatform::start(|req| (StatusCode::OK, empty_page(&req.path))).await;

    let source = source_for(&platform, 20);
    let mut filter = filter();
    filter.end_date = None;

    assert!(source.list_calls(&filter).await.unwrap().is_empty());

    let requests = platform.requests_to("/Calls.json");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].query.contains("StartTime%3E="));
    assert!(!requests[0].query.contains("StartTime%3C="));
}

#[tokio::test]
async fn credentials_never_follow_links_to_other_hosts() {
    let platform = MockPlatform::start(|_| {
        (
            StatusCode::OK,
            r#"{"alerts": [{"sid": "NO1", "log_level": "error"}],
                "meta": {"next_page_url": "http://198.51.100.7/v1/Alerts?Page=1"}}"#
                .to_string(),
        )
    })
    .await;

    let alerts = source_for(&platform, 20)
        .list_alerts(&filter())
        .await
        .unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(platform.requests().len(), 1);
}

#[tokio::test]
async fn page_limit_stops_pagination() {
    let platform = MockPlatform::start(|_| {
        (
            StatusCode::OK,
            r#"{"calls": [{"sid": "CA1"}], "next_page_uri": "/2010-04-01/Accounts/AC123/Calls.json?Page=9"}"#
                .to_string(),
        )
    })
    .await;

    let source = source_for(&platform, 2);
    let calls = source.list_calls(&filter()).await.unwrap();

    assert_eq!(calls.len(), 2);
    assert_eq!(platform.requests().len(), 2);
}

#[tokio::test]
async fn api_error_bodies_carry_the_platform_code() {
    let platform = MockPlatform::start(|_| {
        (
            StatusCode::NOT_FOUND,
            r#"{"code": 999, "message": "Now you gonna die!", "more_info": "", "status": 404}"#
                .to_string(),
        )
    })
    .await;

    let err = source_for(&platform, 20)
        .list_alerts(&filter())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(999));
    assert_eq!(err.to_string(), "Now you gonna die!");
}

#[tokio::test]
async fn non_json_errors_have_no_code() {
    let platform = MockPlatform::start(|_| {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded".to_string())
    })
    .await;

    let err = source_for(&platform, 20)
        .list_messages(&filter())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Api { status: 500, code: None, .. }));
    assert_eq!(err.to_string(), "HTTP 500");
}
