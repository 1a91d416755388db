use axum::async_trait;
use tracing::info;

/// Out-of-band delivery of recovery secrets (reset links, OTPs).
///
/// Held in app state as `Arc<dyn Notifier>` so deployments can swap in a real
/// SMTP or API-backed sender without touching the handlers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default sender for local dev: logs the message instead of delivering it.
#[derive(Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(to = %to, subject = %subject, body = %body, "notification send stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_delivers() {
        let sink = LogNotifier;
        sink.send("s1@example.com", "Password reset", "code 123456")
            .await
            .expect("log delivery cannot fail");
    }
}
