use crate::error::ContactError;
use crate::models::{ContactForm, ContactSubmission};
use crate::notify::email::{auto_reply, company_notification, Mailer};
use crate::notify::sheets::{contact_row, SpreadsheetSink};
use crate::repository::ContactRepository;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which channels actually took the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub email_sent: bool,
    pub firebase_saved: bool,
    pub sheets_saved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactReceipt {
    pub submission: ContactSubmission,
    pub channels: ChannelReport,
}

/// Contact-form fan-out: email first and fatal, then two best-effort sinks.
#[derive(Clone)]
pub struct ContactPipeline {
    mailer: Arc<dyn Mailer>,
    company_email: String,
    contacts: Arc<dyn ContactRepository>,
    sheet: Option<Arc<dyn SpreadsheetSink>>,
}

impl ContactPipeline {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        company_email: String,
        contacts: Arc<dyn ContactRepository>,
        sheet: Option<Arc<dyn SpreadsheetSink>>,
    ) -> Self {
        Self {
            mailer,
            company_email,
            contacts,
            sheet,
        }
    }

    pub async fn submit(&self, form: ContactForm) -> Result<ContactReceipt, ContactError> {
        let submission = form.accept(Utc::now()).ok_or_else(|| {
            warn!("Contact form rejected: missing required fields");
            ContactError::Validation
        })?;

        info!("Processing contact submission from {}", submission.email);

        // Email is the only channel allowed to fail the request
        self.send_emails(&submission).await?;

        let firebase_saved = match self.contacts.save_contact(&submission).await {
            Ok(id) => {
                info!("✅ Saved contact submission {}", id);
                true
            }
            Err(e) => {
                error!("❌ Contact store error (non-critical): {:#}", e);
                false
            }
        };

        let sheets_saved = match &self.sheet {
            Some(sheet) => match sheet.append_row(contact_row(&submission)).await {
                Ok(_) => {
                    info!("✅ Saved contact submission to spreadsheet");
                    true
                }
                Err(e) => {
                    error!("❌ Spreadsheet error (non-critical): {:#}", e);
                    false
                }
            },
            None => {
                info!("Spreadsheet not configured, skipping");
                false
            }
        };

        Ok(ContactReceipt {
            submission,
            channels: ChannelReport {
                email_sent: true,
                firebase_saved,
                sheets_saved,
            },
        })
    }

    async fn send_emails(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        let notification = company_notification(submission, &self.company_email);
        let company_id = self
            .mailer
            .send(&notification)
            .await
            .map_err(|e| {
                error!("Email error: {:#}", e);
                ContactError::EmailDispatch(e)
            })?;
        info!("Company notification sent: {}", company_id);

        let reply = auto_reply(submission);
        let reply_id = self.mailer.send(&reply).await.map_err(|e| {
            error!("Auto-reply error: {:#}", e);
            ContactError::EmailDispatch(e)
        })?;
        info!("Auto-reply sent: {}", reply_id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::notify::email::{Mailer, OutgoingEmail};
    use crate::notify::sheets::SpreadsheetSink;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: AtomicBool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            let mailer = Self::default();
            mailer.fail.store(true, Ordering::SeqCst);
            mailer
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("SMTP connection refused");
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            Ok(format!("<{}@test>", sent.len()))
        }
    }

    #[derive(Default)]
    pub struct RecordingSheet {
        pub rows: Mutex<Vec<Vec<String>>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SpreadsheetSink for RecordingSheet {
        async fn append_row(&self, values: Vec<String>) -> Result<u64> {
            if self.fail {
                anyhow::bail!("spreadsheet not shared with service account");
            }
            self.rows.lock().unwrap().push(values);
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingMailer, RecordingSheet};
    use super::*;
    use crate::repository::MemoryRepository;

    fn form(name: &str) -> ContactForm {
        ContactForm {
            name: Some(name.to_string()),
            email: Some("a@b.com".to_string()),
            phone: None,
            message: Some("hi".to_string()),
        }
    }

    struct Harness {
        mailer: Arc<RecordingMailer>,
        store: Arc<MemoryRepository>,
        sheet: Arc<RecordingSheet>,
        pipeline: ContactPipeline,
    }

    fn harness(mailer: RecordingMailer, sheet: RecordingSheet) -> Harness {
        let mailer = Arc::new(mailer);
        let store = Arc::new(MemoryRepository::new());
        let sheet = Arc::new(sheet);
        let pipeline = ContactPipeline::new(
            mailer.clone(),
            "office@agency.test".to_string(),
            store.clone(),
            Some(sheet.clone()),
        );
        Harness {
            mailer,
            store,
            sheet,
            pipeline,
        }
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_side_effects() {
        let h = harness(RecordingMailer::default(), RecordingSheet::default());
        let err = h.pipeline.submit(form("")).await.unwrap_err();
        assert!(matches!(err, ContactError::Validation));
        assert!(h.mailer.sent().is_empty());
        assert!(h.store.contacts().await.is_empty());
        assert!(h.sheet.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_channels_succeed() {
        let h = harness(RecordingMailer::default(), RecordingSheet::default());
        let receipt = h.pipeline.submit(form("Ada")).await.unwrap();
        assert_eq!(
            receipt.channels,
            ChannelReport {
                email_sent: true,
                firebase_saved: true,
                sheets_saved: true
            }
        );
        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "office@agency.test");
        assert_eq!(sent[1].to, "a@b.com");
        assert_eq!(h.store.contacts().await[0].status, "new");
        assert_eq!(h.sheet.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn email_failure_is_fatal_and_skips_best_effort_sinks() {
        let h = harness(RecordingMailer::failing(), RecordingSheet::default());
        let err = h.pipeline.submit(form("Ada")).await.unwrap_err();
        assert!(matches!(err, ContactError::EmailDispatch(_)));
        assert!(h.store.contacts().await.is_empty());
        assert!(h.sheet.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn best_effort_failures_are_reported_not_raised() {
        let h = harness(
            RecordingMailer::default(),
            RecordingSheet {
                fail: true,
                ..RecordingSheet::default()
            },
        );
        h.store.set_fail_writes(true);
        let receipt = h.pipeline.submit(form("Ada")).await.unwrap();
        assert_eq!(
            receipt.channels,
            ChannelReport {
                email_sent: true,
                firebase_saved: false,
                sheets_saved: false
            }
        );
    }

    #[tokio::test]
    async fn unconfigured_sheet_reports_not_saved() {
        let store = Arc::new(MemoryRepository::new());
        let pipeline = ContactPipeline::new(
            Arc::new(RecordingMailer::default()),
            "office@agency.test".to_string(),
            store,
            None,
        );
        let receipt = pipeline.submit(form("Ada")).await.unwrap();
        assert!(receipt.channels.firebase_saved);
        assert!(!receipt.channels.sheets_saved);
    }
}
