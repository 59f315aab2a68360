/*
 * Responsibility
 * - localized OTP / password-reset emails
 * - the message text lives in the catalog; this only wraps it in HTML
 */
use crate::i18n::{Lang, MessageKey};
use crate::services::mail::OutgoingMail;

pub fn verification_mail(lang: &Lang, to: &str, code: &str, ttl_minutes: u64) -> OutgoingMail {
    render(
        lang,
        to,
        MessageKey::OtpEmailSubject,
        MessageKey::OtpEmailBody,
        code,
        ttl_minutes,
    )
}

pub fn password_reset_mail(lang: &Lang, to: &str, code: &str, ttl_minutes: u64) -> OutgoingMail {
    render(
        lang,
        to,
        MessageKey::ResetEmailSubject,
        MessageKey::ResetEmailBody,
        code,
        ttl_minutes,
    )
}

fn render(
    lang: &Lang,
    to: &str,
    subject: MessageKey,
    body: MessageKey,
    code: &str,
    ttl_minutes: u64,
) -> OutgoingMail {
    let minutes = ttl_minutes.to_string();
    let text = lang.format(body, &[("code", code), ("minutes", &minutes)]);

    OutgoingMail {
        to: to.to_string(),
        subject: lang.t(subject),
        html: format!(
            "<!DOCTYPE html><html lang=\"{}\"><body><p>{}</p><p><strong>{}</strong></p></body></html>",
            lang.locale(),
            escape(&text),
            escape(code)
        ),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
