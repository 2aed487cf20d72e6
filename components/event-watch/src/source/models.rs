// Local crates
use crate::helpers::converters::{
    deserialize_error_code, deserialize_nullable_string, deserialize_platform_timestamp,
};

// External crates
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Debugger alert from the monitor API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub sid: String,
    #[serde(default, deserialize_with = "deserialize_platform_timestamp")]
    pub date_created: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub log_level: String,
    #[serde(default, deserialize_with = "deserialize_error_code")]
    pub error_code: String,
    /// URL-encoded payload, usually `Msg=...&parserMessage=...`.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub alert_text: String,
}

/// Message resource from the REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub sid: String,
    #[serde(default, deserialize_with = "deserialize_platform_timestamp")]
    pub date_updated: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub direction: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub body: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub from: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub to: String,
}

/// Call resource from the REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    #[serde(default)]
    pub sid: String,
    #[serde(default, deserialize_with = "deserialize_platform_timestamp")]
    pub date_updated: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub direction: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub from: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub to: String,
}

/// The three record lists returned by one poll, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct FetchedEvents {
    pub alerts: Vec<Alert>,
    pub messages: Vec<Message>,
    pub calls: Vec<Call>,
}

impl FetchedEvents {
    /// Records across all three listings.
    pub fn total(&self) -> usize {
        self.alerts.len() + self.messages.len() + self.calls.len()
    }
}

/// Paging metadata carried by monitor API list responses.
#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlertPage {
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallPage {
    #[serde(default)]
    pub calls: Vec<Call>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

/// A single page of a list response: its records and the link to the next page.
///
/// REST API pages link with a path relative to the API host (`next_page_uri`), monitor
/// API pages with an absolute URL (`meta.next_page_url`). Both are returned as-is and
/// resolved by the caller.
pub trait ListPage {
    type Record;

    fn into_parts(self) -> (Vec<Self::Record>, Option<String>);
}

impl ListPage for AlertPage {
    type Record = Alert;

    fn into_parts(self) -> (Vec<Alert>, Option<String>) {
        (self.alerts, self.meta.next_page_url)
    }
}

impl ListPage for MessagePage {
    type Record = Message;

    fn into_parts(self) -> (Vec<Message>, Option<String>) {
        (self.messages, self.next_page_uri)
    }
}

impl ListPage for CallPage {
    type Record = Call;

    fn into_parts(self) -> (Vec<Call>, Option<String>) {
        (self.calls, self.next_page_uri)
    }
}

/// Error body returned by both APIs on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn alert_page_decodes_nulls_and_numeric_codes() {
        let body = r#"{
            "alerts": [{
                "sid": "NO11111111111111111111111111111111",
                "log_level": "warning",
                "error_code": 11200,
                "alert_text": null,
                "date_created": "1969-02-24T20:40:30Z"
            }],
            "meta": { "next_page_url": null }
        }"#;

        let page: AlertPage = serde_json::from_str(body).unwrap();
        let (alerts, next) = page.into_parts();

        assert_eq!(next, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].error_code, "11200");
        assert_eq!(alerts[0].alert_text, "");
        assert_eq!(
            alerts[0].date_created,
            Utc.with_ymd_and_hms(1969, 2, 24, 20, 40, 30).unwrap()
        );
    }

    #[test]
    fn message_page_reads_rfc2822_dates() {
        let body = r#"{
            "messages": [{
                "sid": "SM1",
                "status": "delivered",
                "direction": "outbound-api",
                "body": "hello",
                "from": "+15551234567",
                "to": "+15557654321",
                "date_updated": "Wed, 14 Oct 2026 12:00:00 +0000"
            }],
            "next_page_uri": "/2010-04-01/Accounts/AC1/Messages.json?Page=1"
        }"#;

        let page: MessagePage = serde_json::from_str(body).unwrap();
        let (messages, next) = page.into_parts();

        assert_eq!(next.as_deref(), Some("/2010-04-01/Accounts/AC1/Messages.json?Page=1"));
        assert_eq!(
            messages[0].date_updated,
            Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
        );
    }
}
