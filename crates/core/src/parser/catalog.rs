//! Catalog table extraction.
//!
//! The catalog is a markdown document containing a pipe-delimited table of
//! rows `| title | [link text](url) | description |`. Parsing is a
//! line-oriented scan: every pattern that fails to match degrades to a
//! documented default instead of producing an error.

use crate::model::Lab;

/// Path prefix stripped from catalog urls when deriving lab ids.
pub const CATALOG_URL_PREFIX: &str = "./labs/";

/// Level assumed when the description carries no `level <n>` marker.
pub const DEFAULT_LEVEL: &str = "200";

/// Duration assumed when the description carries no `<n> min` marker.
pub const DEFAULT_DURATION: &str = "30 minutes";

/// Persona assumed when none of the known personas appears.
pub const DEFAULT_PERSONA: &str = "Maker";

const PERSONAS: [&str; 3] = ["maker", "developer", "admin"];

/// Parse the catalog document into catalog-level labs.
///
/// Rows whose first cell contains a header marker (`Title` or `---`) are
/// skipped wherever they appear; the scan never assumes a fixed header row
/// count. Rows without a well-formed link cell, or whose derived id is
/// empty, are skipped rather than reported.
#[must_use]
pub fn parse_catalog(text: &str) -> Vec<Lab> {
    let mut labs = Vec::new();

    for line in text.lines() {
        let Some(cells) = split_row(line) else {
            continue;
        };
        if cells.len() < 3 {
            continue;
        }

        let title = cells[0];
        if title.contains("Title") || title.contains("---") {
            continue;
        }

        let Some((_link_text, url)) = parse_link(cells[1]) else {
            continue;
        };
        let description = cells[2];

        let Ok(lab) = Lab::new(
            lab_id_from_url(url),
            title,
            url,
            description,
            extract_level(description),
            extract_duration(description),
            extract_persona(description),
        ) else {
            continue;
        };
        labs.push(lab);
    }

    labs
}

/// Derive the stable lab id from a catalog url.
///
/// Strips the `./labs/` prefix when present and any trailing slash, leaving
/// the url's last path segment.
#[must_use]
pub fn lab_id_from_url(url: &str) -> &str {
    let trimmed = url.trim();
    let without_prefix = trimmed.strip_prefix(CATALOG_URL_PREFIX).unwrap_or(trimmed);
    without_prefix.trim_end_matches('/')
}

/// Split a pipe-delimited table line into trimmed cells.
///
/// Returns `None` for lines that are not table rows.
pub(crate) fn split_row(line: &str) -> Option<Vec<&str>> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|')?;
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    Some(inner.split('|').map(str::trim).collect())
}

/// Extract `[text](url)` from a cell.
fn parse_link(cell: &str) -> Option<(&str, &str)> {
    let open = cell.find('[')?;
    let rest = &cell[open + 1..];
    let close = rest.find(']')?;
    let text = &rest[..close];
    let after = rest[close + 1..].strip_prefix('(')?;
    let end = after.find(')')?;
    Some((text, after[..end].trim()))
}

/// Find `level <digits>` (case-insensitive) in free-form text.
#[must_use]
pub fn extract_level(text: &str) -> String {
    let lower = text.to_lowercase();
    for (index, _) in lower.match_indices("level") {
        let tail = lower[index + "level".len()..].trim_start();
        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        if !digits.is_empty() {
            return digits;
        }
    }
    DEFAULT_LEVEL.to_owned()
}

/// Find `<digits> min` (case-insensitive) and normalize to `<n> minutes`.
#[must_use]
pub fn extract_duration(text: &str) -> String {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index].is_ascii_digit() {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            let tail = lower[index..].trim_start();
            if tail.starts_with("min") {
                return format!("{} minutes", &lower[start..index]);
            }
        } else {
            index += 1;
        }
    }
    DEFAULT_DURATION.to_owned()
}

/// Match the text against the known persona vocabulary.
#[must_use]
pub fn extract_persona(text: &str) -> String {
    let lower = text.to_lowercase();
    for persona in PERSONAS {
        if lower.contains(persona) {
            return capitalize(persona);
        }
    }
    DEFAULT_PERSONA.to_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
