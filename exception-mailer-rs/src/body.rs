//! Notification body rendering
//!
//! The body is built in two stages. The static portion (source location,
//! message, query, and trace) is rendered first and is the sole input to
//! the dedup signature. Request-context fields and the footer are appended
//! afterwards, and the whole body is word-wrapped last, so neither can ever
//! affect the signature.

use crate::report::{FailureReport, RequestContext, StackFrame};
use crate::MAILER_NAME;

/// Column width the final body is wrapped at.
pub const WRAP_COLUMNS: usize = 70;

/// Renders the static portion of the notification body.
pub fn render_static_body(report: &FailureReport) -> String {
    let mut body = String::new();

    body.push_str("Dear admin,\n\n");
    body.push_str(&format!(
        "An exception has been thrown in file {} at line {}:\n\n",
        report.file(),
        report.line()
    ));

    body.push_str(&"=".repeat(65));
    body.push_str("\n\n");
    body.push_str(report.message());
    if let Some(query) = report.query() {
        body.push_str("\n\nQuery was:\n\n");
        body.push_str(query);
    }
    body.push_str("\n\n");
    body.push_str(&"=".repeat(65));
    body.push_str("\n\n");

    body.push_str("Debug backtrace:\n");
    body.push_str(&"-".repeat(15));
    body.push_str("\n\n");

    if report.frames().is_empty() {
        // Synthetic frame for a failure raised outside any recorded call.
        body.push_str(&format!(
            "File: {} at line {}\n",
            report.file(),
            report.line()
        ));
        body.push_str("Function: main()\n");
    } else {
        for frame in report.frames() {
            render_frame(&mut body, frame);
        }
    }

    body
}

fn render_frame(body: &mut String, frame: &StackFrame) {
    if let Some((file, line)) = &frame.location {
        body.push_str(&format!("File: {} at line {}\n", file, line));
    }

    match (&frame.class, &frame.function) {
        (Some(class), Some(function)) => {
            body.push_str(&format!("Method: {}::{}()\n", class, function));
        }
        (None, Some(function)) => {
            body.push_str(&format!("Function: {}()\n", function));
        }
        _ => {}
    }
}

/// Appends the additional-information section with every present, non-empty
/// request-context field.
pub fn append_request_context(body: &mut String, ctx: &RequestContext) {
    body.push_str("\nAdditional information:\n");
    body.push_str(&"-".repeat(22));
    body.push_str("\n\n");

    let fields = [
        ("User Agent", &ctx.user_agent),
        ("Request URI", &ctx.request_uri),
        ("Referrer", &ctx.referrer),
        ("Client Address", &ctx.client_addr),
        ("Server Address", &ctx.server_addr),
    ];

    for (label, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            body.push_str(&format!("{}: {}\n", label, value));
        }
    }
}

/// Appends the mailer identity footer and the suppression notice.
pub fn append_footer(body: &mut String) {
    body.push('\n');
    body.push_str(&"_".repeat(60));
    body.push('\n');
    body.push_str(MAILER_NAME);
    body.push('\n');
    body.push_str(
        "\n\nNote: You will not receive further emails for this failure in the next 24 hours.\n",
    );
}

/// Wraps each line of `text` at `width` columns, breaking at spaces.
///
/// Words longer than the width are left unbroken on their own line.
pub fn word_wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let mut column = 0;
        for word in line.split(' ') {
            if column == 0 {
                out.push_str(word);
                column = word.len();
            } else if column + 1 + word.len() > width {
                out.push('\n');
                out.push_str(word);
                column = word.len();
            } else {
                out.push(' ');
                out.push_str(word);
                column += 1 + word.len();
            }
        }
    }

    out
}
