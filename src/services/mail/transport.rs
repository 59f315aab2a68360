//! lettre-backed mailer: SMTP relay or the local sendmail binary.
use async_trait::async_trait;
use lettre::{
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::{MailConfig, MailTransport, SmtpSecurity};
use crate::services::mail::client::{MailError, MailResult, Mailer, OutgoingMail};

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Sendmail(AsyncSendmailTransport<Tokio1Executor>),
}

pub struct LettreMailer {
    transport: Transport,
    from: Mailbox,
}

impl std::fmt::Debug for LettreMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LettreMailer")
            .field("backend", &self.backend_name())
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl LettreMailer {
    pub fn new(config: &MailConfig) -> MailResult<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", config.from, e)))?;

        let transport = match &config.transport {
            MailTransport::Smtp {
                host,
                port,
                username,
                password,
                security,
            } => {
                let builder = match security {
                    SmtpSecurity::None => {
                        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    }
                    SmtpSecurity::StartTls => {
                        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                            .map_err(|e| MailError::Transport(e.to_string()))?
                    }
                    SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                        .map_err(|e| MailError::Transport(e.to_string()))?,
                };
                let builder = builder.port(*port);
                let builder = match (username, password) {
                    (Some(user), Some(pass)) => {
                        builder.credentials(Credentials::new(user.clone(), pass.clone()))
                    }
                    _ => builder,
                };
                Transport::Smtp(builder.build())
            }
            MailTransport::Sendmail { path } => Transport::Sendmail(
                AsyncSendmailTransport::<Tokio1Executor>::new_with_command(path),
            ),
        };

        Ok(Self { transport, from })
    }

    fn build_message(&self, mail: OutgoingMail) -> MailResult<Message> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", mail.to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| MailError::Message(e.to_string()))
    }
}

#[async_trait]
impl Mailer for LettreMailer {
    fn backend_name(&self) -> &'static str {
        match self.transport {
            Transport::Smtp(_) => "smtp",
            Transport::Sendmail(_) => "sendmail",
        }
    }

    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        let message = self.build_message(mail)?;

        match &self.transport {
            Transport::Smtp(t) => t
                .send(message)
                .await
                .map(|_| ())
                .map_err(|e| MailError::Transport(e.to_string())),
            Transport::Sendmail(t) => t
                .send(message)
                .await
                .map_err(|e| MailError::Transport(e.to_string())),
        }
    }
}
