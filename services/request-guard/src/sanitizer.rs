// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markup stripping for admitted input.

/// Remove anything that looks like a tag.
///
/// Every `<` starts a tag that runs through the next `>`. A `<` with no
/// closing `>` swallows the rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        output.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => return output,
        }
    }

    output.push_str(rest);
    output
}
