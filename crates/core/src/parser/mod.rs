//! Markdown-to-lab extraction pipeline.
//!
//! Deliberately not a general markdown parser: the scanners only understand
//! the authoring conventions used by the lab corpus, and every failed match
//! degrades to a documented default rather than an error.

mod catalog;
mod document;

pub use catalog::{
    extract_duration, extract_level, extract_persona, lab_id_from_url, parse_catalog,
    CATALOG_URL_PREFIX, DEFAULT_DURATION, DEFAULT_LEVEL, DEFAULT_PERSONA,
};
pub use document::{
    parse_lab_document, sections, slugify, LabDetails, LabDocument, Section, LAB_IMAGE_BASE,
};
