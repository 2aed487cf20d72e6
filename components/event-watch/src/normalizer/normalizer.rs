// Local crates
use crate::{
    normalizer::models::{EventKind, LogEvent, Privacy},
    source::models::{Alert, Call, Message},
};

/// Number of leading characters of a phone number left visible under `--no-pii`.
const VISIBLE_PHONE_PREFIX: usize = 5;

/// Query string keys that carry a human readable alert message, in preference order.
const ALERT_MESSAGE_KEYS: [&str; 2] = ["parserMessage", "Msg"];

/// Map a debugger alert onto the display schema.
pub fn normalize_alert(alert: &Alert) -> LogEvent {
    LogEvent {
        date: alert.date_created,
        kind: EventKind::Debugger(alert.log_level.clone()),
        code: alert.error_code.clone(),
        text: alert_text_message(&alert.alert_text).unwrap_or_else(|| alert.alert_text.clone()),
    }
}

/// Map a message onto the display schema. Bodies become a character count under
/// `--no-pii`.
pub fn normalize_message(message: &Message, privacy: Privacy) -> LogEvent {
    let kind = if is_outbound(&message.direction) {
        EventKind::MessageOut
    } else {
        EventKind::MessageIn
    };

    let text = if privacy.redact_pii {
        format!("{} chars", message.body.chars().count())
    } else {
        message.body.clone()
    };

    LogEvent {
        date: message.date_updated,
        kind,
        code: message.status.clone(),
        text,
    }
}

/// Map a call onto the display schema.
pub fn normalize_call(call: &Call, privacy: Privacy) -> LogEvent {
    let kind = if is_outbound(&call.direction) {
        EventKind::CallOut
    } else {
        EventKind::CallIn
    };

    LogEvent {
        date: call.date_updated,
        kind,
        code: call.status.clone(),
        text: format!(
            "FROM: {}, TO: {}",
            redact_phone(&call.from, privacy),
            redact_phone(&call.to, privacy)
        ),
    }
}

/// Extract the human readable message from a URL-encoded alert payload.
///
/// Returns `None` when the payload carries neither a `parserMessage` nor a `Msg`
/// field, or when both are empty; callers fall back to the raw text.
pub fn alert_text_message(alert_text: &str) -> Option<String> {
    if alert_text.is_empty() {
        return None;
    }

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(alert_text.as_bytes())
        .into_owned()
        .collect();

    ALERT_MESSAGE_KEYS.iter().find_map(|wanted| {
        pairs
            .iter()
            .find(|(key, value)| key == wanted && !value.is_empty())
            .map(|(_, value)| value.clone())
    })
}

/// Mask every digit after the first five characters when redaction is on.
pub fn redact_phone(number: &str, privacy: Privacy) -> String {
    if !privacy.redact_pii {
        return number.to_string();
    }

    number
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i >= VISIBLE_PHONE_PREFIX && c.is_ascii_digit() {
                '*'
            } else {
                c
            }
        })
        .collect()
}

fn is_outbound(direction: &str) -> bool {
    direction.contains("out")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const REDACT: Privacy = Privacy { redact_pii: true };

    #[test]
    fn alert_prefers_parser_message_then_msg() {
        assert_eq!(
            alert_text_message("Msg=fallback&parserMessage=Invalid+TwiML&sourceComponent=1"),
            Some("Invalid TwiML".to_string())
        );
        assert_eq!(
            alert_text_message("Msg=HTTP%20retrieval%20failure&httpResponse=502"),
            Some("HTTP retrieval failure".to_string())
        );
        assert_eq!(alert_text_message("parserMessage=&Msg=second"), Some("second".into()));
    }

    #[test]
    fn alert_text_falls_back_to_raw_payload() {
        let alert = Alert {
            sid: "NO1".into(),
            date_created: Utc.with_ymd_and_hms(1969, 2, 24, 19, 39, 29).unwrap(),
            log_level: "info".into(),
            error_code: "11111".into(),
            alert_text: r#"My name is "Sue"!"#.into(),
        };

        let event = normalize_alert(&alert);

        assert_eq!(event.text, r#"My name is "Sue"!"#);
        assert_eq!(event.kind, EventKind::Debugger("info".into()));
        assert_eq!(event.code, "11111");
        assert_eq!(event.date, alert.date_created);
    }

    #[test]
    fn message_direction_and_body_redaction() {
        let message = Message {
            sid: "SM1".into(),
            direction: "outbound-api".into(),
            status: "sent".into(),
            body: "héllo world".into(),
            ..Message::default()
        };

        let plain = normalize_message(&message, Privacy::default());
        assert_eq!(plain.kind, EventKind::MessageOut);
        assert_eq!(plain.text, "héllo world");
        assert_eq!(plain.code, "sent");

        let redacted = normalize_message(&message, REDACT);
        assert_eq!(redacted.text, "11 chars");

        let inbound = Message {
            direction: "inbound".into(),
            ..message
        };
        assert_eq!(normalize_message(&inbound, REDACT).kind, EventKind::MessageIn);
    }

    #[test]
    fn call_numbers_are_masked_after_fifth_character() {
        assert_eq!(redact_phone("+15551234567", REDACT), "+1555*******");
        assert_eq!(redact_phone("+15551234567", Privacy::default()), "+15551234567");
        assert_eq!(redact_phone("client:alice", REDACT), "client:alice");

        let call = Call {
            sid: "CA1".into(),
            direction: "inbound".into(),
            status: "ringing".into(),
            from: "+15551234567".into(),
            to: "+15557654321".into(),
            ..Call::default()
        };

        let event = normalize_call(&call, REDACT);
        assert_eq!(event.kind, EventKind::CallIn);
        assert_eq!(event.text, "FROM: +1555*******, TO: +1555*******");
    }
}
