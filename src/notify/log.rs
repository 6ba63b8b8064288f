use super::Notifier;
use serde::Serialize;

/// Logs every result as a JSON line through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    pretty: bool,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multi-line JSON instead of one line per record
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn render<T: Serialize>(&self, record: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(record)
        } else {
            serde_json::to_string(record)
        }
    }
}

impl<T: Serialize> Notifier<T> for LogNotifier {
    fn on_new_data(&self, source: &str, record: &T) {
        match self.render(record) {
            Ok(json) => tracing::info!(target: "spell_harvest::records", "[{}] {}", source, json),
            Err(e) => tracing::error!("[{}] Failed to serialize record: {}", source, e),
        }
    }

    fn on_completed(&self, source: &str) {
        tracing::info!("[{}] Completed", source);
    }
}
