pub mod email;
pub mod pipeline;
pub mod sheets;

pub use email::{DisabledMailer, Mailer, OutgoingEmail, SmtpConfig, SmtpMailer};
pub use pipeline::{ChannelReport, ContactPipeline, ContactReceipt};
pub use sheets::{GoogleSheetsSink, ServiceAccount, SpreadsheetSink};
