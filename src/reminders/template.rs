//! Reminder email rendering
//!
//! Minimal `{{placeholder}}` substitution. Tenants may store a custom template
//! in their reminder settings; otherwise the default below is used.

/// Default reminder body. Available placeholders: `{{customer_name}}`,
/// `{{order_number}}`, `{{total}}`, `{{days_overdue}}`.
pub const DEFAULT_TEMPLATE: &str = "\
<p>Dear {{customer_name}},</p>\
<p>This is a reminder that payment for order <strong>{{order_number}}</strong> \
(amount due: {{total}}) is {{days_overdue}} day(s) overdue.</p>\
<p>Please settle the outstanding amount at your earliest convenience.</p>";

/// Replace every `{{key}}` occurrence with its value. Unknown placeholders are
/// left as-is.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}
