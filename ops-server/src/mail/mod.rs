//! 邮件通知
//!
//! HTML 模板通过 `include_str!` 编译进二进制，`{{KEY}}` 占位符替换后交给
//! [`Mailer`] 发送。默认实现 [`OutboxMailer`] 把邮件写成 `.eml` 文件放进
//! `<work_dir>/outbox/`，由外部投递程序取走。
//!
//! 发送失败只记录日志，不影响业务请求。

pub mod templates;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use templates::{
    applicant_hired, applicant_rejected, applicant_stage_changed, request_approved,
    request_rejected,
};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail has no recipient")]
    NoRecipient,

    #[error("Failed to write mail: {0}")]
    Io(#[from] std::io::Error),
}

/// 待发送邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// 写入 outbox 目录的邮件发送器
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
    from: String,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn render_eml(&self, mail: &OutgoingMail) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}",
            self.from,
            mail.to,
            mail.subject,
            chrono::Utc::now().to_rfc2822(),
            mail.html_body
        )
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if mail.to.trim().is_empty() {
            return Err(MailError::NoRecipient);
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!(
            "{}-{}.eml",
            shared::util::now_millis(),
            uuid::Uuid::new_v4().simple()
        );
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, self.render_eml(&mail)).await?;
        tracing::info!(to = %mail.to, subject = %mail.subject, path = %path.display(), "Mail queued in outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_writes_eml() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = OutboxMailer::new(dir.path().join("outbox"), "hr@farm.test");
        mailer
            .send(OutgoingMail {
                to: "ana@example.com".into(),
                subject: "Hello".into(),
                html_body: "<p>Hi</p>".into(),
            })
            .await
            .unwrap();

        let mut entries = std::fs::read_dir(mailer.dir()).unwrap();
        let entry = entries.next().unwrap().unwrap();
        let content = std::fs::read_to_string(entry.path()).unwrap();
        assert!(content.starts_with("From: hr@farm.test\r\nTo: ana@example.com\r\n"));
        assert!(content.ends_with("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn test_empty_recipient_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = OutboxMailer::new(dir.path(), "hr@farm.test");
        let err = mailer
            .send(OutgoingMail {
                to: " ".into(),
                subject: "x".into(),
                html_body: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::NoRecipient));
    }
}
