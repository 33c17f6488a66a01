//! Section splitter for markdown documents.
//!
//! Splits on level-2 headings. Level-1 headings update the running document
//! title that is repeated in every chunk header.

/// Minimum trimmed body length (exclusive) for a section to become a chunk.
pub const MIN_BODY_CHARS: usize = 30;

const DEFAULT_SECTION: &str = "Introduction";
const FULL_DOCUMENT: &str = "Full Document";

/// One section of a document, before metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub section: String,
    /// `# {title}\n## {section}\n{body}`
    pub content: String,
    /// 1-based line of the opening `## ` heading (1 for the leading section)
    pub line_start: usize,
}

/// Split `content` into sections. `default_title` is used until a `# ` heading appears.
pub fn split_sections(content: &str, default_title: &str) -> Vec<Section> {
    let lines: Vec<&str> = content.lines().collect();
    let mut sections = Vec::new();

    let mut title = default_title.to_string();
    let mut section = DEFAULT_SECTION.to_string();
    let mut body: Vec<&str> = Vec::new();
    let mut line_start = 1;

    let mut i = front_matter_end(&lines).map(|end| end + 1).unwrap_or(0);
    while i < lines.len() {
        let line = lines[i];

        if let Some(heading) = line.strip_prefix("# ") {
            title = heading.trim().to_string();
        } else if let Some(heading) = line.strip_prefix("## ") {
            flush(&mut sections, &title, &section, &body, line_start);
            section = heading.trim().to_string();
            body.clear();
            line_start = i + 1;
        } else {
            body.push(line);
        }

        i += 1;
    }
    flush(&mut sections, &title, &section, &body, line_start);

    let trimmed = content.trim();
    if sections.is_empty() && trimmed.chars().count() > MIN_BODY_CHARS {
        sections.push(Section {
            section: FULL_DOCUMENT.to_string(),
            content: trimmed.to_string(),
            line_start: 1,
        });
    }

    sections
}

/// Index of the closing `---` when the document opens with a front-matter block.
fn front_matter_end(lines: &[&str]) -> Option<usize> {
    match lines.first() {
        Some(first) if first.trim() == "---" => lines
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, l)| l.trim() == "---")
            .map(|(idx, _)| idx),
        _ => None,
    }
}

fn flush(sections: &mut Vec<Section>, title: &str, section: &str, body: &[&str], line_start: usize) {
    let text = body.join("\n");
    let text = text.trim();
    if text.chars().count() > MIN_BODY_CHARS {
        sections.push(Section {
            section: section.to_string(),
            content: format!("# {}\n## {}\n{}", title, section, text),
            line_start,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "This body is comfortably longer than thirty characters.";

    #[test]
    fn test_two_sections() {
        let doc = format!("# Title\n\n## One\n{LONG}\n\n## Two\n{LONG}\n");
        let sections = split_sections(&doc, "a");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section, "One");
        assert_eq!(sections[0].line_start, 3);
        assert_eq!(sections[0].content, format!("# Title\n## One\n{LONG}"));
        assert_eq!(sections[1].section, "Two");
        assert_eq!(sections[1].line_start, 6);
    }

    #[test]
    fn test_default_title_and_introduction() {
        let doc = format!("{LONG}\n## Next\n{LONG}");
        let sections = split_sections(&doc, "notes");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section, "Introduction");
        assert_eq!(sections[0].line_start, 1);
        assert!(sections[0].content.starts_with("# notes\n## Introduction\n"));
    }

    #[test]
    fn test_h1_does_not_close_chunk() {
        let doc = format!("## Only\nfirst half of the body text\n# Renamed\n{LONG}");
        let sections = split_sections(&doc, "x");

        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.starts_with("# Renamed\n## Only\n"));
        assert!(sections[0].content.contains("first half"));
    }

    #[test]
    fn test_short_sections_discarded() {
        let doc = format!("## Tiny\nshort\n## Real\n{LONG}");
        let sections = split_sections(&doc, "x");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, "Real");
    }

    #[test]
    fn test_exactly_thirty_chars_discarded() {
        let body = "a".repeat(30);
        let doc = format!("## Edge\n{body}");
        // Whole document is longer than 30, so it falls back to Full Document
        let sections = split_sections(&doc, "x");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, "Full Document");

        let sections = split_sections(&body, "x");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_front_matter_skipped() {
        let doc = format!("---\ntitle: secret-front-matter\n---\n## Body\n{LONG}");
        let sections = split_sections(&doc, "x");

        assert_eq!(sections.len(), 1);
        assert!(!sections[0].content.contains("secret-front-matter"));
        assert_eq!(sections[0].line_start, 4);
    }

    #[test]
    fn test_unclosed_front_matter_is_content() {
        let doc = format!("---\n{LONG}");
        let sections = split_sections(&doc, "x");

        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("---"));
    }

    #[test]
    fn test_level_three_heading_is_body() {
        let doc = format!("## Parent\n### Child\n{LONG}");
        let sections = split_sections(&doc, "x");

        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("### Child"));
    }

    #[test]
    fn test_empty_document() {
        assert!(split_sections("", "x").is_empty());
        assert!(split_sections("   \n\n", "x").is_empty());
    }
}
