//! Inbound text messages from the daemon's event stream.

use futures::stream::{Stream, StreamExt};
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::BroadcasterConfig;
use crate::error::RelayError;
use crate::sender::Destination;

/// A text message someone sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    /// Sender phone number.
    pub sender: String,
    /// Group the message was posted in, if any.
    pub group_id: Option<String>,
    /// Message body.
    pub text: String,
}

impl InboundText {
    /// The conversation a reply should go to.
    pub fn reply_to(&self) -> Destination {
        match &self.group_id {
            Some(group_id) => Destination::Group(group_id.clone()),
            None => Destination::Direct(self.sender.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReceiveEvent {
    envelope: Envelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    source: String,
    #[serde(default)]
    source_number: Option<String>,
    #[serde(default)]
    data_message: Option<DataMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    group_info: Option<GroupInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupInfo {
    group_id: String,
}

/// Parse a `receive` event payload. Non-text envelopes yield `None`.
fn parse_receive(data: &str) -> Result<Option<InboundText>, RelayError> {
    let event: ReceiveEvent = serde_json::from_str(data)?;
    let envelope = event.envelope;

    let Some(data_message) = envelope.data_message else {
        return Ok(None);
    };
    let Some(text) = data_message.message else {
        return Ok(None);
    };

    let sender = envelope
        .source_number
        .filter(|n| !n.is_empty())
        .unwrap_or(envelope.source);

    Ok(Some(InboundText {
        sender,
        group_id: data_message.group_info.map(|g| g.group_id),
        text,
    }))
}

/// Subscribe to inbound text messages.
///
/// Receipts, typing notifications and other non-text events are skipped.
/// Transport errors are yielded as items; the underlying event source
/// reconnects on its own.
pub fn subscribe(
    config: &BroadcasterConfig,
) -> Result<impl Stream<Item = Result<InboundText, RelayError>> + Send, RelayError> {
    let url = config.events_url();
    info!("Subscribing to daemon events at {}", url);

    // No timeout: the event stream is long-lived.
    let source = reqwest::Client::new()
        .get(&url)
        .eventsource()
        .map_err(|e| RelayError::Sse(e.to_string()))?;

    Ok(source.filter_map(|event| async move {
        match event {
            Ok(Event::Open) => {
                debug!("Event stream opened");
                None
            }
            Ok(Event::Message(message)) if message.event == "receive" => {
                match parse_receive(&message.data) {
                    Ok(inbound) => inbound.map(Ok),
                    Err(e) => {
                        warn!("Failed to parse receive event: {}", e);
                        None
                    }
                }
            }
            Ok(Event::Message(message)) => {
                debug!("Ignoring event type: {}", message.event);
                None
            }
            Err(e) => Some(Err(RelayError::Sse(e.to_string()))),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_command() {
        let data = r#"{"envelope":{
            "source":"+33611111111","sourceNumber":"+33611111111","timestamp":1700000000000,
            "dataMessage":{"timestamp":1700000000000,"message":"/vigilance",
                "groupInfo":{"groupId":"Z3JvdXA=","type":"DELIVER"}}
        },"account":"+33600000000"}"#;

        let inbound = parse_receive(data).unwrap().unwrap();
        assert_eq!(inbound.text, "/vigilance");
        assert_eq!(inbound.reply_to(), Destination::Group("Z3JvdXA=".to_string()));
    }

    #[test]
    fn test_parse_direct_message() {
        let data = r#"{"envelope":{"source":"+33611111111",
            "dataMessage":{"message":"/config list"}}}"#;

        let inbound = parse_receive(data).unwrap().unwrap();
        assert_eq!(inbound.reply_to(), Destination::Direct("+33611111111".to_string()));
    }

    #[test]
    fn test_receipt_is_skipped() {
        let data = r#"{"envelope":{"source":"+33611111111",
            "receiptMessage":{"when":1700000000000,"isDelivery":true}}}"#;
        assert!(parse_receive(data).unwrap().is_none());
    }

    #[test]
    fn test_invalid_payload() {
        assert!(matches!(parse_receive("not json"), Err(RelayError::Json(_))));
    }
}
