//! Outbound email collaborator.
//!
//! Email is strictly a side channel: delivery failures are logged and never
//! retried, and an unconfigured sender address means delivery is skipped
//! entirely. The trait seam exists so tests can substitute a recording
//! implementation and so deployments can wire a real transport without
//! touching the workflow code.

use std::sync::Arc;

/// Sends one HTML email. Implementations must be cheap to call from async
/// context or shift their own work off-thread.
pub trait Mailer: Send + Sync {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default mailer: logs deliveries. With no sender address configured it
/// degrades to a silent skip, mirroring an unconfigured SMTP transport.
pub struct LogMailer {
    from: Option<String>,
}

impl LogMailer {
    pub fn new(from: Option<String>) -> Self {
        Self { from }
    }
}

impl Mailer for LogMailer {
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match &self.from {
            Some(from) => {
                tracing::info!(from, to, subject, bytes = html_body.len(), "email sent");
                Ok(())
            }
            None => {
                tracing::warn!(to, subject, "email not configured, skipping");
                Ok(())
            }
        }
    }
}

/// Fire-and-forget delivery on a detached task. The workflow's transactional
/// outcome never waits on, or fails because of, the mailer.
pub fn send_best_effort(mailer: Arc<dyn Mailer>, to: String, subject: String, html_body: String) {
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&to, &subject, &html_body) {
            tracing::error!(to, subject, error = %err, "email send failed");
        }
    });
}

/// Approval-request email sent to the configured admin address on signup.
pub fn approval_request_email(full_name: &str, username: &str, role: &str, email: &str) -> (String, String) {
    (
        "New User Registration Approval Needed".to_string(),
        format!(
            "<h2>New User Registration</h2>\
             <p><strong>{full_name}</strong> ({username}) has requested access as <strong>{role}</strong>.</p>\
             <p>Email: {email}</p>\
             <p>Please log in to approve or reject this user.</p>"
        ),
    )
}

/// Confirmation email sent to a newly approved user.
pub fn account_approved_email(full_name: &str, app_url: &str) -> (String, String) {
    (
        "Your Account has been Approved".to_string(),
        format!(
            "<h2>Welcome to MMGH!</h2>\
             <p>Hi {full_name},</p>\
             <p>Your account has been approved and you can now log in to the system.</p>\
             <p>Visit: {app_url}</p>"
        ),
    )
}

/// Rejection email sent to a rejected registrant.
pub fn account_rejected_email(full_name: &str, reason: &str) -> (String, String) {
    (
        "Account Registration Rejected".to_string(),
        format!(
            "<h2>Registration Status</h2>\
             <p>Hi {full_name},</p>\
             <p>Unfortunately, your registration request has been rejected.</p>\
             <p>Reason: {reason}</p>\
             <p>Contact the administrator for more information.</p>"
        ),
    )
}
