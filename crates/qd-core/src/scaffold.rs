//! `qd create`: new Quarkdown project skeleton.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{QdError, Result};
use crate::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocType {
    Plain,
    #[default]
    Paged,
    Slides,
    Docs,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Plain => "plain",
            DocType::Paged => "paged",
            DocType::Slides => "slides",
            DocType::Docs => "docs",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(DocType::Plain),
            "paged" => Ok(DocType::Paged),
            "slides" => Ok(DocType::Slides),
            "docs" => Ok(DocType::Docs),
            other => Err(format!(
                "unknown document type '{other}' (expected plain, paged, slides, or docs)"
            )),
        }
    }
}

const ASSET_DIRS: [&str; 3] = ["images", "code", "diagrams"];

const CONTENT_QD: &str = "# Introduction

.loremipsum

## Background

This is your first section.

.box {Getting Started} type:{tip}
    Edit this file to add your content.

<<<

# Conclusion

Summary of your document.
";

/// Create `parent/name` with entry, setup, and content files.
///
/// Refuses to touch an existing directory.
pub fn create_project(parent: &Path, name: &str, doc_type: DocType) -> Result<PathBuf> {
    let project = parent.join(name);
    if project.exists() {
        return Err(QdError::ProjectExists(project));
    }

    for dir in ASSET_DIRS {
        io::ensure_dir(&project.join(dir))?;
    }

    let title = display_name(name);
    io::atomic_write(&project.join("main.qd"), main_qd(doc_type).as_bytes())?;
    io::atomic_write(&project.join("setup.qd"), setup_qd(&title).as_bytes())?;
    io::atomic_write(&project.join("content.qd"), CONTENT_QD.as_bytes())?;

    tracing::info!(project = %project.display(), %doc_type, "created project");
    Ok(project)
}

/// Printed after a successful `create`.
pub fn summary(name: &str) -> String {
    format!(
        "Structure:\n  \
         {name}/\n    \
         main.qd      # Entry point\n    \
         setup.qd     # Metadata & TOC\n    \
         content.qd   # Your content\n    \
         images/      # Image assets\n    \
         code/        # Code snippets\n    \
         diagrams/    # Mermaid diagrams\n\n\
         To compile: qd preview {name}/main.qd"
    )
}

fn main_qd(doc_type: DocType) -> String {
    format!(
        ".theme {{paperwhite}} layout:{{latex}}\n\
         .doctype {{{doc_type}}}\n\
         \n\
         .includeall\n    \
         - setup.qd\n    \
         - content.qd\n"
    )
}

fn setup_qd(title: &str) -> String {
    format!(
        ".docname {{{title}}}\n\
         .docauthor {{Author}}\n\
         .doclang {{English}}\n\
         \n\
         .footer\n    \
         {title}\n\
         \n\
         .center\n    \
         #! .docname\n    \
         .docauthor\n\
         \n\
         ---\n\
         \n\
         .abstract\n    \
         Brief description of this document.\n\
         \n\
         .tableofcontents\n"
    )
}

/// `my_report` → `My Report`. Letters after a non-letter start a new word.
fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
