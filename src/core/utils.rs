use chrono::{DateTime, FixedOffset};

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    Some(datetime?.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Zip fields must be exactly 6 characters.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.chars().count() == 6
}

/// Shallow shape check, the storage layer does not inspect emails further.
pub fn is_email_shaped(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
