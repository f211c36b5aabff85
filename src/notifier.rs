use log::{error, info, warn};

use crate::caption::{build_caption, CaptionStyle};
use crate::gateway::Gateway;
use crate::models::ContentItem;
use crate::store::{AuditLog, NotifiedSet};

pub const AUDIT_ACTION: &str = "Notified";

/// Outcome counts for one notify pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotifyReport {
    pub sent: usize,
    pub already_notified: usize,
    pub missing_poster: usize,
    pub failed: usize,
}

impl NotifyReport {
    pub fn merge(&mut self, other: NotifyReport) {
        self.sent += other.sent;
        self.already_notified += other.already_notified;
        self.missing_poster += other.missing_poster;
        self.failed += other.failed;
    }
}

pub struct Notifier<'a> {
    gateway: &'a Gateway,
    audit: &'a AuditLog,
    web_base: &'a str,
}

impl<'a> Notifier<'a> {
    pub fn new(gateway: &'a Gateway, audit: &'a AuditLog, web_base: &'a str) -> Self {
        Self { gateway, audit, web_base }
    }

    /// Send every item not yet in `notified`. Successful sends are added to
    /// `notified` and audited; failures are logged and left for the next run.
    pub async fn notify(
        &self,
        items: &[ContentItem],
        notified: &mut NotifiedSet,
        style: CaptionStyle,
    ) -> NotifyReport {
        let mut report = NotifyReport::default();

        if items.is_empty() {
            info!("No content to notify for {:?}", style);
            return report;
        }

        for item in items {
            if notified.contains(item.id) {
                info!("Content {} already notified, skipping", item.title);
                report.already_notified += 1;
                continue;
            }

            // Not marked as notified, so it is picked up once a poster exists.
            if !item.has_poster() {
                info!("Content {} has no poster, skipping", item.title);
                report.missing_poster += 1;
                continue;
            }

            let caption = build_caption(item, style, self.web_base);
            match self
                .gateway
                .send_file_by_url(&item.poster_url, &item.poster_file_name(), &caption)
                .await
            {
                Ok(()) => {
                    info!("Notification with poster sent for {}", item.title);
                    notified.insert(item.id);
                    report.sent += 1;
                    if let Err(e) = self.audit.record(AUDIT_ACTION, &item.title) {
                        warn!("Failed to write audit line for {}: {}", item.title, e);
                    }
                }
                Err(e) => {
                    error!("Failed to send notification for {}: {}", item.title, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::models::ContentKind;
    use httpmock::prelude::*;
    use std::fs;

    const SEND_PATH: &str = "/waInstance1/sendFileByUrl/t";

    fn gateway_for(server: &MockServer) -> Gateway {
        Gateway::new(&GatewayConfig {
            api_url: server.base_url(),
            instance_id: "1".into(),
            api_token: "t".into(),
            chat_number: "42".into(),
        })
    }

    fn item(id: i64, poster: &str) -> ContentItem {
        ContentItem {
            id,
            kind: ContentKind::Movie,
            title: format!("Film {id}"),
            release_date: Some("2024-03-15".into()),
            description: "desc".into(),
            poster_url: poster.into(),
            genres: "Drama".into(),
        }
    }

    #[tokio::test]
    async fn items_without_poster_are_never_sent_or_marked() {
        let server = MockServer::start_async().await;
        let send = server.mock(|when, then| {
            when.method(POST).path(SEND_PATH);
            then.status(200);
        });
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path().join("audit.log"));
        let gateway = gateway_for(&server);
        let notifier = Notifier::new(&gateway, &audit, "https://web");

        let mut notified = NotifiedSet::new();
        let report = notifier
            .notify(&[item(5, "")], &mut notified, CaptionStyle::TopRated(ContentKind::Movie))
            .await;

        send.assert_hits(0);
        assert!(!notified.contains(5));
        assert_eq!(report.missing_poster, 1);
        assert!(!dir.path().join("audit.log").exists());
    }

    #[tokio::test]
    async fn already_notified_items_are_skipped() {
        let server = MockServer::start_async().await;
        let send = server.mock(|when, then| {
            when.method(POST).path(SEND_PATH);
            then.status(200);
        });
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path().join("audit.log"));
        let gateway = gateway_for(&server);
        let notifier = Notifier::new(&gateway, &audit, "https://web");

        let mut notified: NotifiedSet = [1].into_iter().collect();
        let report = notifier
            .notify(
                &[item(1, "https://img/1.jpg"), item(2, "https://img/2.jpg")],
                &mut notified,
                CaptionStyle::TopRated(ContentKind::Movie),
            )
            .await;

        send.assert_hits(1);
        assert_eq!(notified.ids(), &[1, 2]);
        assert_eq!(report, NotifyReport { sent: 1, already_notified: 1, missing_poster: 0, failed: 0 });

        let audit_lines = fs::read_to_string(dir.path().join("audit.log")).unwrap();
        assert_eq!(audit_lines.lines().count(), 1);
        assert!(audit_lines.contains("Notified - Film 2"));
    }

    #[tokio::test]
    async fn failed_dispatch_leaves_item_unmarked_and_continues() {
        let server = MockServer::start_async().await;
        let send = server.mock(|when, then| {
            when.method(POST).path(SEND_PATH);
            then.status(500);
        });
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::new(dir.path().join("audit.log"));
        let gateway = gateway_for(&server);
        let notifier = Notifier::new(&gateway, &audit, "https://web");

        let mut notified = NotifiedSet::new();
        let report = notifier
            .notify(
                &[item(1, "https://img/1.jpg"), item(2, "https://img/2.jpg")],
                &mut notified,
                CaptionStyle::Latest,
            )
            .await;

        // Both attempted: the first failure does not abort the batch.
        send.assert_hits(2);
        assert!(notified.is_empty());
        assert_eq!(report.failed, 2);
        assert!(!dir.path().join("audit.log").exists());
    }
}
