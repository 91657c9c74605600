//! `ExpiresByType`/`ExpiresDefault` duration parsing (§4.2): `"access plus
//! <N> <unit> ..."` summed into a second count.

/// Parses an expires duration string into a total second count.
///
/// Returns `None` on any malformed input: missing `access plus` prefix, an
/// odd token after the prefix, a non-integer count, or an unrecognized
/// unit. The caller treats `None` the same as any other per-line parse
/// failure — warn and skip (§7).
#[must_use]
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim().trim_matches('"');
    let mut words = text.split_whitespace();

    let access = words.next()?;
    let plus = words.next()?;
    if !access.eq_ignore_ascii_case("access") || !plus.eq_ignore_ascii_case("plus") {
        return None;
    }

    let mut total: u64 = 0;
    let mut saw_pair = false;
    let remaining: Vec<&str> = words.collect();
    if remaining.is_empty() || remaining.len() % 2 != 0 {
        return None;
    }
    for pair in remaining.chunks_exact(2) {
        let count: u64 = pair[0].parse().ok()?;
        let factor = unit_seconds(pair[1])?;
        total = total.checked_add(count.checked_mul(factor)?)?;
        saw_pair = true;
    }

    saw_pair.then_some(total)
}

fn unit_seconds(unit: &str) -> Option<u64> {
    let unit = unit.trim_end_matches('s');
    match unit.to_ascii_lowercase().as_str() {
        "second" => Some(1),
        "minute" => Some(60),
        "hour" => Some(3_600),
        "day" => Some(86_400),
        "month" => Some(2_592_000),
        "year" => Some(31_536_000),
        _ => None,
    }
}
