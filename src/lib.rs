//! piiscan - directory PII scanner.
//!
//! Walks a directory tree, classifies files by magic bytes, extracts text
//! (with OCR fallback for images and scanned PDF pages), runs pattern and
//! entity PII detectors over the text, and writes CSV/JSON reports keyed
//! by content hash so repeated scans skip unchanged files.

pub mod cli;
pub mod config;
pub mod detect;
pub mod extract;
pub mod hash;
pub mod image_prep;
pub mod mime;
pub mod models;
pub mod report;
pub mod scan;
pub mod walker;
