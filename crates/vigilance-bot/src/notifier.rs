//! Composing and delivering change notifications.

use std::collections::BTreeMap;
use std::sync::Arc;

use broadcaster::{ChatSender, Destination, OutgoingMessage, RelayError};
use meteo_client::{AlertLevel, BulletinText, RegionId};
use tracing::{debug, info};

/// Longest segment the chat platform takes in one message, in characters.
pub const MAX_SEGMENT_CHARS: usize = 2000;

/// Banner written before every escalated region.
pub const ESCALATION_BANNER: &str = "**Attention, nouvelles vigilances en cours**\n";

/// One line per downgraded region.
pub fn compose_downgrades(downgrades: &[RegionId]) -> String {
    downgrades
        .iter()
        .map(|region| format!("Baisse de vigilance pour {}\n", region))
        .collect()
}

/// Escalation banners followed by the bulletin texts.
///
/// A level without a colour word (anything but orange and red) still gets
/// its banner, with an empty qualifier.
pub fn compose(escalations: &BTreeMap<RegionId, AlertLevel>, bulletins: &[BulletinText]) -> String {
    let mut message = String::new();

    for (region, level) in escalations {
        message.push_str(ESCALATION_BANNER);
        message.push_str(&format!(
            "{}: vigilance {}.\n",
            region,
            level.qualifier().unwrap_or_default()
        ));
    }
    message.push_str(&format_bulletins(bulletins));

    message
}

/// `**<name>** : <text>` blocks separated by blank lines.
pub fn format_bulletins(bulletins: &[BulletinText]) -> String {
    bulletins
        .iter()
        .map(|b| format!("**{}** : {}\n\n", b.name, b.text))
        .collect()
}

/// Split `message` into consecutive segments of at most `max_chars` characters.
///
/// Segments are cut on character boundaries, never inside a code point.
/// Their concatenation is `message`. An empty message yields no segment.
pub fn split(message: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Sends composed notifications to the configured channel.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn ChatSender>,
    channel: Destination,
}

impl Notifier {
    pub fn new(sender: Arc<dyn ChatSender>, channel: Destination) -> Self {
        Self { sender, channel }
    }

    pub fn channel(&self) -> &Destination {
        &self.channel
    }

    /// Send `message` in order, one segment at a time.
    ///
    /// Returns the number of segments sent. The first failing segment
    /// aborts the rest; earlier segments stay delivered and nothing is
    /// retried.
    pub async fn dispatch(&self, message: &str) -> Result<usize, RelayError> {
        let segments = split(message, MAX_SEGMENT_CHARS);
        if segments.is_empty() {
            info!("RAS, nothing to notify");
            return Ok(0);
        }

        let total = segments.len();
        for (index, segment) in segments.into_iter().enumerate() {
            debug!(segment = index + 1, total, "Sending notification segment");
            self.sender
                .send(&self.channel, &OutgoingMessage::text(segment))
                .await?;
        }

        info!(segments = total, "Notification sent");
        Ok(total)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("channel", &self.channel)
            .finish()
    }
}
