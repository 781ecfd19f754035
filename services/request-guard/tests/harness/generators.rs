// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for traffic simulation.

/// Generate a pool of distinct caller identifiers.
pub fn generate_identifiers(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("user-{:05}", i)).collect()
}

/// Evenly spaced request timestamps starting at `start_ms`.
pub fn generate_timeline(start_ms: u64, interval_ms: u64, count: usize) -> Vec<u64> {
    (0..count as u64).map(|i| start_ms + i * interval_ms).collect()
}

/// Inputs carrying markup that must be stripped on admit.
pub fn generate_hostile_inputs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("<script>alert(1)</script>", "alert(1)"),
        ("<img src=x onerror=alert(1)>", ""),
        ("plain text", "plain text"),
        ("<a href=\"javascript:void(0)\">click</a>", "click"),
        ("<<b>>nested", ">nested"),
        ("trailing <div", "trailing "),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_unique() {
        let ids = generate_identifiers(100);
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_timeline_spacing() {
        assert_eq!(generate_timeline(10, 5, 3), vec![10, 15, 20]);
    }
}
