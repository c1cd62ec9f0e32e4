pub const BLANK: &str = "can't be blank";

pub fn require_presence(value: Option<&str>) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => None,
        _ => Some(BLANK.to_string()),
    }
}

pub fn require_greater_than(threshold: i64, value: i64) -> Option<String> {
    if value > threshold {
        None
    } else {
        Some(format!("must be greater than {threshold}"))
    }
}
