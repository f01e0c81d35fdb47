// HTML mail over SMTP, sent through a `curl` subprocess.
// Port 465 uses implicit TLS (smtps://); anything else upgrades with
// STARTTLS and refuses to continue without it (--ssl-reqd).

use async_trait::async_trait;
use log::info;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use flowc_core::atoms::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use flowc_core::http::with_linear_retries;
use flowc_core::{EngineError, EngineResult};

use super::Mailer;

pub struct SmtpMailer {
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    from: String,
    to: String,
    retry_delay: Duration,
}

impl SmtpMailer {
    pub fn new(
        host: Option<&str>,
        port: u16,
        user: Option<&str>,
        password: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> EngineResult<Self> {
        let present = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let host = present(host).ok_or_else(|| EngineError::Config("SMTP_HOST not set".into()))?;
        let to = present(to).ok_or_else(|| EngineError::Config("SMTP_TO not set".into()))?;
        let user = present(user);
        let from = present(from)
            .or_else(|| user.clone())
            .ok_or_else(|| EngineError::Config("SMTP_FROM not set".into()))?;
        Ok(SmtpMailer {
            host,
            port,
            user,
            password: present(password),
            from,
            to,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn url(&self) -> String {
        let scheme = if self.port == 465 { "smtps" } else { "smtp" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// curl arguments, without the message itself (read from stdin).
    pub(crate) fn curl_args(&self) -> Vec<String> {
        let mut args = vec![
            "--silent".to_string(),
            "--show-error".to_string(),
            "--ssl-reqd".to_string(),
            "--connect-timeout".to_string(),
            "10".to_string(),
            "--url".to_string(),
            self.url(),
            "--mail-from".to_string(),
            self.from.clone(),
            "--mail-rcpt".to_string(),
            self.to.clone(),
        ];
        if let Some(user) = &self.user {
            args.push("--user".to_string());
            args.push(format!("{}:{}", user, self.password.as_deref().unwrap_or("")));
        }
        args.push("-T".to_string());
        args.push("-".to_string());
        args
    }

    pub(crate) fn message(&self, subject: &str, html: &str) -> String {
        format!(
            "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{html}",
            from = self.from,
            to = self.to,
        )
    }

    /// One curl run. Spawn, stdin and exit-status failures are all errors.
    async fn send_once(&self, message: &str) -> EngineResult<()> {
        let mut child = Command::new("curl")
            .args(self.curl_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(EngineError::delivery("email", format!("SMTP error: {}", stderr.trim())))
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, subject: &str, html: &str) -> EngineResult<()> {
        info!("[email] Sending '{}' to {} via {}:{}", subject, self.to, self.host, self.port);
        let message = self.message(subject, html);
        let message = message.as_str();
        with_linear_retries("email", DEFAULT_RETRIES, self.retry_delay, move |_| self.send_once(message)).await?;
        info!("[email] Sent to {}", self.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(port: u16, user: Option<&str>) -> SmtpMailer {
        SmtpMailer::new(Some("smtp.example.org"), port, user, Some("pw"), Some("me@example.org"), Some("you@example.org"))
            .unwrap()
    }

    #[test]
    fn starttls_on_submission_port() {
        let args = mailer(587, Some("me")).curl_args();
        assert!(args.contains(&"smtp://smtp.example.org:587".to_string()));
        assert!(args.contains(&"--ssl-reqd".to_string()));
        assert!(args.contains(&"me:pw".to_string()));
        assert_eq!(&args[args.len() - 2..], ["-T", "-"]);
    }

    #[test]
    fn implicit_tls_and_anonymous() {
        let args = mailer(465, None).curl_args();
        assert!(args.contains(&"smtps://smtp.example.org:465".to_string()));
        assert!(!args.contains(&"--user".to_string()));
    }

    #[test]
    fn message_is_html() {
        let msg = mailer(587, None).message("[FlowC] Evening Report", "<p>hi</p>");
        assert!(msg.starts_with("From: me@example.org\r\nTo: you@example.org\r\nSubject: [FlowC] Evening Report\r\n"));
        assert!(msg.contains("Content-Type: text/html; charset=utf-8"));
        assert!(msg.ends_with("\r\n\r\n<p>hi</p>"));
    }

    #[test]
    fn from_defaults_to_user() {
        let m = SmtpMailer::new(Some("h"), 587, Some("u@x"), None, None, Some("t@x")).unwrap();
        assert!(m.message("s", "b").starts_with("From: u@x\r\n"));
        assert!(matches!(SmtpMailer::new(None, 587, None, None, None, Some("t")), Err(EngineError::Config(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_retried_then_reported() {
        let m = SmtpMailer::new(Some("127.0.0.1"), 1, None, None, Some("me@example.org"), Some("you@example.org"))
            .unwrap()
            .with_retry_delay(Duration::from_millis(40));
        let start = std::time::Instant::now();
        assert!(m.send_html("s", "<p>b</p>").await.is_err());
        // Three attempts means two sleeps: 40 ms then 80 ms.
        assert!(start.elapsed() >= Duration::from_millis(120));
    }
}
