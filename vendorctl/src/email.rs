//! Email service for supplier notifications and password flows.
//!
//! Four email kinds are sent: the welcome email on approval (carrying the
//! password setup link), the rejection notice, the payment confirmation, and
//! password reset emails.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::Path;

use crate::{config::Config, errors::Error};

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    reply_to: Option<String>,
    base_url: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            crate::config::EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                // Use SMTP transport
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            crate::config::EmailTransportConfig::File { path } => {
                // Use file transport for development/testing
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                let file_transport = AsyncFileTransport::<Tokio1Executor>::new(emails_dir);
                EmailTransport::File(file_transport)
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            reply_to: email_config.reply_to.clone(),
            base_url: config.dashboard_url.clone(),
        })
    }

    /// Welcome email sent when an admin approves a supplier. Carries the
    /// password setup link.
    pub async fn send_welcome_email(
        &self,
        to_email: &str,
        contact_name: &str,
        reference: &str,
        token_id: &uuid::Uuid,
        token: &str,
    ) -> Result<(), Error> {
        let setup_link = format!("{}/set-password?id={}&token={}", self.base_url, token_id, token);

        let subject = "Your supplier application has been approved";
        let body = self.create_welcome_body(contact_name, reference, &setup_link);

        self.send_email(to_email, Some(contact_name), subject, &body).await
    }

    /// Rejection notice sent when an admin rejects a supplier application.
    pub async fn send_rejection_email(
        &self,
        to_email: &str,
        contact_name: &str,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let subject = "Update on your supplier application";
        let body = self.create_rejection_body(contact_name, reference, reason);

        self.send_email(to_email, Some(contact_name), subject, &body).await
    }

    /// Payment confirmation sent after a checkout session is confirmed paid.
    pub async fn send_payment_confirmation_email(
        &self,
        to_email: &str,
        contact_name: &str,
        amount: rust_decimal::Decimal,
        duration_years: i32,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), Error> {
        let subject = "Payment confirmation";
        let body = self.create_payment_confirmation_body(contact_name, amount, duration_years, expires_at);

        self.send_email(to_email, Some(contact_name), subject, &body).await
    }

    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        token_id: &uuid::Uuid,
        token: &str,
    ) -> Result<(), Error> {
        let reset_link = format!("{}/reset-password?id={}&token={}", self.base_url, token_id, token);

        let subject = "Password Reset Request";
        let body = self.create_password_reset_body(to_name, &reset_link);

        self.send_email(to_email, to_name, subject, &body).await
    }

    async fn send_email(&self, to_email: &str, to_name: Option<&str>, subject: &str, body: &str) -> Result<(), Error> {
        // Create from mailbox
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        // Create to mailbox
        let to = if let Some(name) = to_name {
            format!("{name} <{to_email}>")
        } else {
            to_email.to_string()
        }
        .parse::<Mailbox>()
        .map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        // Build message
        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = &self.reply_to {
            let reply_to = reply_to.parse::<Mailbox>().map_err(|e| Error::Internal {
                operation: format!("parse reply-to email: {e}"),
            })?;
            builder = builder.reply_to(reply_to);
        }

        let message = builder.body(body.to_string()).map_err(|e| Error::Internal {
            operation: format!("build email message: {e}"),
        })?;

        // Send based on transport type
        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }

    fn create_welcome_body(&self, contact_name: &str, reference: &str, setup_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Application Approved</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Welcome aboard!</h2>

        <p>Hello {contact_name},</p>

        <p>Good news: your supplier application (reference <strong>{reference}</strong>) has been approved.</p>

        <p>To activate your account, set your password using the link below:</p>

        <p><a href="{setup_link}">Set your password</a></p>

        <p>Or copy and paste this link into your browser:</p>
        <p>{setup_link}</p>

        <p>This link will expire in 72 hours. After setting your password you will be asked to complete your subscription payment.</p>

        <div class="footer">
            <p>This is an automated message, please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
        )
    }

    fn create_rejection_body(&self, contact_name: &str, reference: &str, reason: Option<&str>) -> String {
        let reason_block = match reason {
            Some(reason) => format!("<p>The reviewer left the following note:</p><blockquote>{reason}</blockquote>"),
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Application Update</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Application Update</h2>

        <p>Hello {contact_name},</p>

        <p>Thank you for your interest. After review, we are unable to approve your supplier application (reference <strong>{reference}</strong>) at this time.</p>

        {reason_block}

        <p>You are welcome to submit a new application once the issues above have been addressed.</p>

        <div class="footer">
            <p>This is an automated message, please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
        )
    }

    fn create_payment_confirmation_body(
        &self,
        contact_name: &str,
        amount: rust_decimal::Decimal,
        duration_years: i32,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> String {
        let expires = expires_at.format("%Y-%m-%d");
        let year_word = if duration_years == 1 { "year" } else { "years" };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Payment Confirmation</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Payment Received</h2>

        <p>Hello {contact_name},</p>

        <p>We have received your payment of <strong>{amount}</strong> for a {duration_years}-{year_word} subscription.</p>

        <p>Your subscription is active until <strong>{expires}</strong>. You can now access your supplier dashboard.</p>

        <div class="footer">
            <p>This is an automated message, please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
        )
    }

    fn create_password_reset_body(&self, to_name: Option<&str>, reset_link: &str) -> String {
        let greeting = if let Some(name) = to_name {
            format!("Hello {name},")
        } else {
            "Hello,".to_string()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset Request</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Password Reset Request</h2>

        <p>{greeting}</p>

        <p>We received a request to reset your password. If you didn't make this request, you can safely ignore this email.</p>

        <p>To reset your password, click the link below:</p>

        <p><a href="{reset_link}">Reset your password</a></p>

        <p>Or copy and paste this link into your browser:</p>
        <p>{reset_link}</p>

        <p>This link will expire in 30 minutes for security reasons.</p>

        <div class="footer">
            <p>If you're having trouble with the button above, copy and paste the URL into your web browser.</p>
            <p>This is an automated message, please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;

    #[tokio::test]
    async fn test_email_service_creation() {
        let config = create_test_config();
        let email_service = EmailService::new(&config);
        assert!(email_service.is_ok());
    }

    #[tokio::test]
    async fn test_welcome_email_body() {
        let config = create_test_config();
        let email_service = EmailService::new(&config).unwrap();

        let body = email_service.create_welcome_body("Jo Park", "SUP-ABCD1234", "https://example.com/set-password?id=1&token=abc");

        assert!(body.contains("Hello Jo Park,"));
        assert!(body.contains("SUP-ABCD1234"));
        assert!(body.contains("https://example.com/set-password?id=1&token=abc"));
    }

    #[tokio::test]
    async fn test_rejection_email_body_includes_reason() {
        let config = create_test_config();
        let email_service = EmailService::new(&config).unwrap();

        let body = email_service.create_rejection_body("Jo Park", "SUP-ABCD1234", Some("Incomplete documentation"));
        assert!(body.contains("Incomplete documentation"));

        let body = email_service.create_rejection_body("Jo Park", "SUP-ABCD1234", None);
        assert!(!body.contains("blockquote"));
    }

    #[tokio::test]
    async fn test_password_reset_email_body() {
        let config = create_test_config();
        let email_service = EmailService::new(&config).unwrap();

        let body = email_service.create_password_reset_body(Some("John Doe"), "https://example.com/reset?token=abc123");

        assert!(body.contains("Hello John Doe,"));
        assert!(body.contains("https://example.com/reset?token=abc123"));
        assert!(body.contains("Reset your password"));
    }
}
