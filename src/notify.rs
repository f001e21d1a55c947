//! Mail delivery of the archived bundle.
//!
//! The message is a hand-built multipart MIME: a plain-text body part and
//! the archive as a base64 attachment, handed to the local `sendmail` on
//! stdin. Delivery is fire-and-forget: a failure is reported to the caller
//! but never reverses the collection run, and the archive stays on disk for
//! manual retrieval.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use log::info;
use uuid::Uuid;

use crate::constants::{ARCHIVE_MIME_TYPE, MIME_BASE64_LINE_WIDTH};

/// Mail `archive_path` to `recipients` with `body` as the cover text.
pub fn notify(recipients: &[String], body: &str, archive_path: &Path) -> Result<()> {
    if recipients.is_empty() {
        return Ok(());
    }

    let message = build_message(recipients, body, archive_path)?;
    deliver(&message)?;
    info!("debug bundle mailed to {}", recipients.join(", "));
    Ok(())
}

/// Assemble the full RFC 2045 message text.
fn build_message(recipients: &[String], body: &str, archive_path: &Path) -> Result<String> {
    let payload = fs::read(archive_path)
        .with_context(|| format!("failed to read {}", archive_path.display()))?;
    let attachment_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("debug.tgz");
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let boundary = format!("freenas-debug-{}", Uuid::new_v4().simple());

    let mut message = String::new();
    message.push_str(&format!("To: {}\r\n", recipients.join(", ")));
    message.push_str(&format!(
        "Subject: debug system dump from {host} ({})\r\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n"
    ));
    message.push_str("\r\n");

    message.push_str(&format!("--{boundary}\r\n"));
    message.push_str("Content-Type: text/plain; charset=us-ascii\r\n\r\n");
    message.push_str(body);
    message.push_str("\r\n");

    message.push_str(&format!("--{boundary}\r\n"));
    message.push_str(&format!("Content-Type: {ARCHIVE_MIME_TYPE}\r\n"));
    message.push_str("Content-Transfer-Encoding: base64\r\n");
    message.push_str(&format!(
        "Content-Disposition: attachment; filename=\"{attachment_name}\"\r\n\r\n"
    ));
    message.push_str(&wrap_base64(&STANDARD.encode(&payload)));
    message.push_str(&format!("--{boundary}--\r\n"));

    Ok(message)
}

/// Fold a base64 string to MIME line width with CRLF terminators.
fn wrap_base64(encoded: &str) -> String {
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / MIME_BASE64_LINE_WIDTH * 2 + 2);
    let bytes = encoded.as_bytes();
    for chunk in bytes.chunks(MIME_BASE64_LINE_WIDTH) {
        // base64 output is always ASCII
        wrapped.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        wrapped.push_str("\r\n");
    }
    wrapped
}

/// Hand the message to the local mail transport on stdin.
fn deliver(message: &str) -> Result<()> {
    let sendmail = which::which("sendmail")
        .unwrap_or_else(|_| "/usr/sbin/sendmail".into());
    let mut child = Command::new(&sendmail)
        .args(["-oi", "-t"])
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {}", sendmail.display()))?;
    child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("sendmail stdin unavailable"))?
        .write_all(message.as_bytes())
        .context("failed to write message to sendmail")?;
    let status = child.wait().context("failed to wait for sendmail")?;
    if !status.success() {
        return Err(anyhow!("sendmail exited with {status}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_message_contains_recipients_and_attachment() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("fndebug.tgz");
        fs::write(&archive, b"not really a tarball").unwrap();

        let recipients = vec!["ops@example.com".to_string(), "admin@example.com".to_string()];
        let message = build_message(&recipients, "generated by: freenas-debug -A", &archive).unwrap();

        assert!(message.contains("To: ops@example.com, admin@example.com"));
        assert!(message.contains("generated by: freenas-debug -A"));
        assert!(message.contains("Content-Type: application/x-gtar-compressed"));
        assert!(message.contains("filename=\"fndebug.tgz\""));
        assert!(message.contains(&STANDARD.encode(b"not really a tarball")));
    }

    #[test]
    fn test_message_boundary_opens_and_closes() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("fndebug.tgz");
        fs::write(&archive, b"payload").unwrap();

        let message =
            build_message(&["a@b.c".to_string()], "body", &archive).unwrap();
        let boundary_line = message
            .lines()
            .find(|l| l.starts_with("--freenas-debug-"))
            .unwrap()
            .to_string();
        assert!(message.ends_with(&format!("{boundary_line}--\r\n")));
    }

    #[test]
    fn test_wrap_base64_folds_long_lines() {
        let encoded = "Q".repeat(200);
        let wrapped = wrap_base64(&encoded);
        for line in wrapped.lines() {
            assert!(line.len() <= MIME_BASE64_LINE_WIDTH);
        }
        assert_eq!(wrapped.matches("\r\n").count(), 3);
    }

    #[test]
    fn test_empty_recipient_list_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("missing.tgz");
        assert!(notify(&[], "body", &archive).is_ok());
    }
}
