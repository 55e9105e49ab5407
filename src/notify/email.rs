use anyhow::{anyhow, Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{Address, AsyncTransport, Tokio1Executor};

use super::{Mailer, OutgoingMail};
use crate::config::MailConfig;

/// Implicit-TLS SMTP sender (port 465, e.g. `smtp.gmail.com`).
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> Result<Self> {
        let (from, to) = mailboxes(cfg)?;
        let creds = Credentials::new(cfg.username.clone(), cfg.password.expose().to_string());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .with_context(|| format!("invalid SMTP host {}", cfg.smtp_host))?
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }
}

/// `From:` is the display name over the login address.
fn mailboxes(cfg: &MailConfig) -> Result<(Mailbox, Mailbox)> {
    let from_addr: Address = cfg
        .username
        .parse()
        .context("server username must be the sending address")?;
    let from = Mailbox::new(Some(cfg.from_name.clone()), from_addr);
    let to: Mailbox = cfg.to.parse().context("invalid recipient address")?;
    Ok((from, to))
}

fn build_message(from: &Mailbox, to: &Mailbox, mail: &OutgoingMail) -> Result<Message> {
    let content = std::fs::read(&mail.attachment)
        .with_context(|| format!("reading attachment {}", mail.attachment.display()))?;
    let filename = mail
        .attachment
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("digest.7z")
        .to_string();
    let archive = ContentType::parse("application/x-7z-compressed")
        .map_err(|e| anyhow!("attachment content type: {e:?}"))?;

    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(Attachment::new(filename).body(content, archive)),
        )
        .context("build email")
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let msg = build_message(&self.from, &self.to, mail)?;
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(
            to = %self.to,
            attachment = %mail.attachment.display(),
            "digest mailed"
        );
        Ok(())
    }
}
