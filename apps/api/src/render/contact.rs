//! Contact segment derivation — the header's contact line as display
//! units, in fixed order: location, email, phone, LinkedIn/Telegram.

use crate::models::resume::ResumeData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSegment {
    pub text: String,
    pub href: Option<String>,
    /// Rendered wrapped in literal brackets (the combined social segment).
    pub bracketed: bool,
}

impl ContactSegment {
    fn plain(text: impl Into<String>) -> Self {
        ContactSegment {
            text: text.into(),
            href: None,
            bracketed: false,
        }
    }

    fn linked(text: impl Into<String>, href: impl Into<String>) -> Self {
        ContactSegment {
            text: text.into(),
            href: Some(href.into()),
            bracketed: false,
        }
    }

    /// Display text with brackets applied where the segment asks for them.
    pub fn display_text(&self) -> String {
        if self.bracketed {
            format!("[{}]", self.text)
        } else {
            self.text.clone()
        }
    }
}

fn has_protocol(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn ensure_protocol(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if has_protocol(value) {
        value.to_string()
    } else {
        format!("https://{value}")
    }
}

fn telegram_href(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if has_protocol(value) {
        return value.to_string();
    }
    let handle = strip_prefix_ci(value.trim_start_matches('@'), &["t.me/"]);
    format!("https://t.me/{handle}")
}

fn phone_href(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    format!("tel:{digits}")
}

fn strip_prefix_ci<'a>(value: &'a str, prefixes: &[&str]) -> &'a str {
    for prefix in prefixes {
        if value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return &value[prefix.len()..];
        }
    }
    value
}

/// Extracts a bare handle from a LinkedIn/Telegram URL or `@handle` form.
fn extract_handle(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let stripped = strip_prefix_ci(
        value,
        &[
            "https://www.linkedin.com/in/",
            "https://linkedin.com/in/",
            "http://www.linkedin.com/in/",
            "http://linkedin.com/in/",
            "https://www.t.me/",
            "https://t.me/",
            "http://www.t.me/",
            "http://t.me/",
        ],
    );
    stripped.trim_start_matches('@').trim_end_matches('/').to_string()
}

/// The combined LinkedIn/Telegram segment: "&"-joined labels, the Telegram
/// handle preferred for display, the LinkedIn URL preferred as target.
fn linked_telegram_segment(resume: &ResumeData) -> Option<ContactSegment> {
    if resume.linkedin.is_empty() && resume.telegram.is_empty() {
        return None;
    }

    let mut labels: Vec<&str> = Vec::new();
    if !resume.linkedin.is_empty() {
        labels.push("LinkedIn");
    }
    if !resume.telegram.is_empty() {
        labels.push("Telegram");
    }

    let handle = {
        let telegram = extract_handle(&resume.telegram);
        if telegram.is_empty() {
            extract_handle(&resume.linkedin)
        } else {
            telegram
        }
    };

    let text = if handle.is_empty() {
        labels.join("&")
    } else {
        format!("{}/{handle}", labels.join("&"))
    };

    let href = if resume.linkedin.is_empty() {
        telegram_href(&resume.telegram)
    } else {
        ensure_protocol(&resume.linkedin)
    };

    Some(ContactSegment {
        text,
        href: Some(href),
        bracketed: true,
    })
}

pub fn build_contact_segments(resume: &ResumeData) -> Vec<ContactSegment> {
    let mut segments = Vec::new();

    if !resume.location.is_empty() {
        segments.push(ContactSegment::plain(&resume.location));
    }

    if !resume.email.is_empty() {
        segments.push(ContactSegment::linked(
            &resume.email,
            format!("mailto:{}", resume.email),
        ));
    }

    if !resume.phone.is_empty() {
        segments.push(ContactSegment::linked(&resume.phone, phone_href(&resume.phone)));
    }

    if let Some(segment) = linked_telegram_segment(resume) {
        segments.push(segment);
    }

    segments
}
