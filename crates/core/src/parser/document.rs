//! Per-lab document extraction.
//!
//! A lab document is free-form markdown following a handful of authoring
//! conventions: an optional `Level | Persona | Duration | Purpose` details
//! table, `## <emoji> Use Case #<n>: <title>` headings with numbered steps,
//! and inline images. The extractors below run independently; any one of
//! them coming up empty never affects the others.

use crate::model::{Image, Step, UseCase};
use crate::parser::catalog::split_row;

/// Base path prefix applied when resolving a lab's inline images.
pub const LAB_IMAGE_BASE: &str = "labs";

/// Parsed contents of a single lab document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabDocument {
    pub details: Option<LabDetails>,
    pub use_cases: Vec<UseCase>,
    pub images: Vec<Image>,
}

/// The data row following the `Level | Persona | Duration | Purpose` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabDetails {
    pub level: String,
    pub persona: String,
    pub duration: String,
    pub purpose: String,
}

/// A heading-delimited slice of a document, with a slugified anchor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub title: String,
    pub content: String,
    pub id: String,
}

/// Extract details, use cases and images from a lab document.
///
/// Best-effort by contract: each extractor degrades to an empty result when
/// its pattern does not appear, and this function never fails.
#[must_use]
pub fn parse_lab_document(text: &str, lab_id: &str) -> LabDocument {
    LabDocument {
        details: parse_details(text),
        use_cases: parse_use_cases(text),
        images: parse_images(text, lab_id),
    }
}

//
// ─── DETAILS ROW ───────────────────────────────────────────────────────────────
//

fn parse_details(text: &str) -> Option<LabDetails> {
    let lines: Vec<&str> = text.lines().collect();
    let header = lines.iter().position(|line| is_details_header(line))?;

    // The next data row after the header; separator rows are skipped.
    for line in &lines[header + 1..] {
        let Some(cells) = split_row(line) else {
            // The table ended without a data row.
            return None;
        };
        if cells.len() < 4 || is_separator_cell(cells[0]) {
            continue;
        }
        return Some(LabDetails {
            level: cells[0].to_owned(),
            persona: cells[1].to_owned(),
            duration: cells[2].to_owned(),
            purpose: cells[3].to_owned(),
        });
    }
    None
}

fn is_details_header(line: &str) -> bool {
    split_row(line).is_some_and(|cells| {
        cells.len() >= 4
            && cells[0] == "Level"
            && cells[1] == "Persona"
            && cells[2] == "Duration"
            && cells[3] == "Purpose"
    })
}

fn is_separator_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| matches!(c, '-' | ':' | ' '))
}

//
// ─── USE CASES ─────────────────────────────────────────────────────────────────
//

const USE_CASE_MARKER: &str = " Use Case #";

fn parse_use_cases(text: &str) -> Vec<UseCase> {
    let lines: Vec<&str> = text.lines().collect();
    let mut use_cases = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some((emoji, number, title)) = parse_use_case_heading(lines[index]) else {
            index += 1;
            continue;
        };

        // Block extent: up to the next heading of any level, a horizontal
        // rule, or end of document.
        let start = index + 1;
        let mut end = start;
        while end < lines.len() && !is_block_end(lines[end]) {
            end += 1;
        }

        use_cases.push(UseCase {
            number,
            emoji,
            title,
            steps: parse_steps(&lines[start..end]),
            completed: false,
        });
        index = end;
    }

    use_cases
}

fn parse_use_case_heading(line: &str) -> Option<(String, u32, String)> {
    let rest = line.strip_prefix("## ")?;
    let marker = rest.find(USE_CASE_MARKER)?;
    let emoji = rest[..marker].trim();
    let tail = &rest[marker + USE_CASE_MARKER.len()..];
    let colon = tail.find(':')?;
    let number: u32 = tail[..colon].trim().parse().ok()?;
    let title = tail[colon + 1..].trim();
    Some((emoji.to_owned(), number, title.to_owned()))
}

fn is_block_end(line: &str) -> bool {
    line.starts_with('#') || line.trim_start().starts_with("---")
}

//
// ─── STEPS ─────────────────────────────────────────────────────────────────────
//

fn parse_steps(block: &[&str]) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut index = 0;

    while index < block.len() {
        let Some((number, first_line)) = parse_step_start(block[index]) else {
            index += 1;
            continue;
        };

        // Instruction extent: up to the next numbered item, blockquote,
        // code fence, heading, or end of block.
        let mut body = vec![first_line];
        index += 1;
        while index < block.len() && !is_step_boundary(block[index]) {
            body.push(block[index].trim_end());
            index += 1;
        }

        let instruction = body.join("\n").trim().to_owned();
        let screenshot = find_inline_image(&instruction).map(|(_, src, _)| src.trim().to_owned());
        steps.push(Step {
            number,
            has_screenshot: has_screenshot(&instruction),
            screenshot,
            instruction,
            completed: false,
        });
    }

    steps
}

fn parse_step_start(line: &str) -> Option<(u32, &str)> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let rest = line[digits_end..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let number = line[..digits_end].parse().ok()?;
    Some((number, rest.trim()))
}

fn is_step_boundary(line: &str) -> bool {
    parse_step_start(line).is_some()
        || line.starts_with('>')
        || line.starts_with("```")
        || line.starts_with('#')
}

/// A step "has a screenshot" when its instruction carries an inline image
/// marker or mentions one in words. Keyword matching is case-sensitive,
/// matching the authoring conventions of the corpus.
fn has_screenshot(instruction: &str) -> bool {
    instruction.contains("![")
        || instruction.contains("screenshot")
        || instruction.contains("image")
}

//
// ─── IMAGES ────────────────────────────────────────────────────────────────────
//

fn parse_images(text: &str, lab_id: &str) -> Vec<Image> {
    let mut images = Vec::new();
    let mut cursor = text;
    while let Some((alt, src, consumed)) = find_inline_image(cursor) {
        let src = src.trim();
        images.push(Image {
            alt: alt.trim().to_owned(),
            src: src.to_owned(),
            full_path: format!("{LAB_IMAGE_BASE}/{lab_id}/{src}"),
        });
        cursor = &cursor[consumed..];
    }
    images
}

/// Locate the first well-formed `![alt](src)` marker.
///
/// Returns the alt text, the source, and the byte offset just past the
/// marker. Malformed candidates (`![` without the rest) are skipped.
fn find_inline_image(text: &str) -> Option<(&str, &str, usize)> {
    let mut offset = 0;
    while let Some(start) = text[offset..].find("![") {
        let start = offset + start;
        let rest = &text[start + 2..];
        let parsed = (|| {
            let close = rest.find(']')?;
            let after = rest[close + 1..].strip_prefix('(')?;
            let end = after.find(')')?;
            Some((&rest[..close], &after[..end], start + 2 + close + 2 + end + 1))
        })();
        match parsed {
            Some(found) => return Some(found),
            None => offset = start + 2,
        }
    }
    None
}

//
// ─── SECTIONS ──────────────────────────────────────────────────────────────────
//

/// Split a document into heading-delimited sections.
#[must_use]
pub fn sections(text: &str) -> Vec<Section> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some((level, title)) = parse_heading(lines[index]) else {
            index += 1;
            continue;
        };

        let start = index + 1;
        let mut end = start;
        while end < lines.len() && parse_heading(lines[end]).is_none() {
            end += 1;
        }

        sections.push(Section {
            level,
            id: slugify(title),
            title: title.to_owned(),
            content: lines[start..end].join("\n").trim().to_owned(),
        });
        index = end;
    }

    sections
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes, rest.trim()))
}

/// Lowercase, strip punctuation, and hyphenate whitespace runs.
#[must_use]
pub fn slugify(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
