//! Alert wording.

/// `TODAY`, `EXPIRED` or `in N days`.
pub fn expiry_phrase(days_remaining: i64) -> String {
    match days_remaining {
        0 => "TODAY".to_string(),
        d if d < 0 => "EXPIRED".to_string(),
        d => format!("in {d} days"),
    }
}

/// Body of the simulated SMS.
pub fn sms_body(item_name: &str, days_remaining: i64) -> String {
    format!(
        "VIGILANT: Your item \"{item_name}\" is expiring {}. Please check your inventory.",
        expiry_phrase(days_remaining)
    )
}

/// Summary stored in the notification log.
pub fn log_content(item_name: &str, recipient: &str) -> String {
    format!("VIGILANT: {item_name} alert routed to {recipient}.")
}
