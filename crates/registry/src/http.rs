//! HAP-over-HTTP status code helpers (spec §4.2, §4.5, §4.7).

/// `200`/`204`: the request succeeded outright.
pub fn is_success(status: u16) -> bool {
    matches!(status, 200 | 204)
}

/// `207`: a bulk `/characteristics` request partially succeeded and the
/// body carries per-id status.
pub fn is_multi_status(status: u16) -> bool {
    status == 207
}

/// Any of the above: the accessory returned a body the client should parse
/// rather than treat as a bare transport failure.
pub fn has_parseable_body(status: u16) -> bool {
    status == 200 || is_multi_status(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_statuses() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(is_multi_status(207));
        assert!(!is_success(404));
    }
}
