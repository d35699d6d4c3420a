// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template parameter normalization.
//!
//! The provider rejects template sends whose body parameter count does not
//! match the approved template, so every send goes through a fixed-count
//! normalization: blank values become a placeholder, extra values are
//! truncated, missing values are padded.

/// Placeholder for blank or missing parameter values.
const PLACEHOLDER: &str = "-";

/// Expected body parameter count for a known template name.
fn expected_count(template: &str) -> Option<usize> {
    match template {
        "seguimiento_llegada_tecnico" => Some(4),
        "mensaje_seguimiento2" => Some(5),
        "seguimiento_cierre" => Some(2),
        _ => None,
    }
}

/// Normalize parameters to the template's fixed count.
///
/// Unknown templates keep their parameter count but still get blank
/// values replaced.
pub fn normalize_params(template: &str, params: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = params
        .iter()
        .map(|p| {
            let trimmed = p.trim();
            if trimmed.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    if let Some(count) = expected_count(template) {
        normalized.truncate(count);
        while normalized.len() < count {
            normalized.push(PLACEHOLDER.to_string());
        }
    }
    normalized
}
