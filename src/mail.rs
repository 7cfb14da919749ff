use crate::error::Error;
use lettre::address::Address;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::address::Envelope;
use lettre::{SmtpTransport, Transport};
use log::debug;
use serde::Deserialize;

/// Mail server settings, usually the `[mail]` table of the config file.
/// `mail_app_password` is only required when sending in production mode.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub mail_server_host: String,
    pub mail_server_port: u16,
    #[serde(default)]
    pub mail_app_password: Option<String>,
}

impl MailConfig {
    fn app_password(&self) -> Result<&str, Error> {
        self.mail_app_password
            .as_deref()
            .ok_or(Error::MissingMailConfig("mail_app_password"))
    }
}

/// Join recipients into a single `To` header value.
/// A one-element list is used verbatim.
fn to_header(recipients: &[&str]) -> String {
    recipients.join(", ")
}

/// Render the flat header+body blob: From, To, Subject, blank line, body.
/// No other headers, no MIME structure.
fn render_message(sender: &str, recipients: &[&str], subject: &str, body: &str) -> String {
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\n\r\n{}\r\n",
        sender,
        to_header(recipients),
        subject,
        body
    )
}

/// Envelope addresses are the bare addr-specs; display names stay in the
/// rendered headers only.
fn envelope(sender: &str, recipients: &[&str]) -> Result<Envelope, Error> {
    let from: Mailbox = sender.parse()?;
    let to: Vec<Address> = recipients
        .iter()
        .map(|r| r.parse::<Mailbox>().map(|m| m.email))
        .collect::<Result<_, _>>()?;
    Ok(Envelope::new(Some(from.email), to)?)
}

/// Send a plain-text email to one or more recipients.
///
/// In production the connection is wrapped in TLS with default
/// certificate validation and authenticated with `(sender,
/// mail_app_password)`; otherwise it is plaintext and unauthenticated,
/// which is only suitable for controlled test environments. The
/// transport lives on this function's stack, so the connection is
/// released on every exit path. SMTP faults propagate unmodified.
pub fn send_mail(
    sender: &str,
    recipients: &[&str],
    subject: &str,
    body: &str,
    in_production: bool,
    config: &MailConfig,
) -> Result<(), Error> {
    let envelope = envelope(sender, recipients)?;
    let message = render_message(sender, recipients, subject, body);

    let mailer = if in_production {
        let password = config.app_password()?;
        let tls = TlsParameters::new(config.mail_server_host.clone())?;
        SmtpTransport::builder_dangerous(&config.mail_server_host)
            .port(config.mail_server_port)
            .tls(Tls::Wrapper(tls))
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build()
    } else {
        SmtpTransport::builder_dangerous(&config.mail_server_host)
            .port(config.mail_server_port)
            .build()
    };

    mailer.send_raw(&envelope, message.as_bytes())?;
    debug!(
        "sent mail to {} recipient(s) via {}:{}",
        recipients.len(),
        config.mail_server_host,
        config.mail_server_port
    );
    Ok(())
}
