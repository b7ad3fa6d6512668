//! KDoc comment model
//!
//! Splits a `/** ... */` block into sections and tags. The first section is
//! the default section; `@constructor` and `@property` open new ones. Every
//! other `@tag` at the start of a line belongs to the section it appears in
//! and owns the text up to the next tag line. Lines inside fenced code blocks
//! are never treated as tags.
//!
//! ```
//! use ruledoc_core::kdoc::KDoc;
//!
//! let doc = KDoc::parse("/**\n * Style rules.\n *\n * @active since v1.0.0\n */");
//! let section = doc.default_section();
//!
//! assert_eq!(section.content, "Style rules.");
//! assert!(section.has_tag("active"));
//! ```

const SECTION_TAGS: &[&str] = &["constructor", "property"];
const SUBJECT_TAGS: &[&str] = &["param", "property", "throws", "exception", "sample", "see"];

/// Parsed KDoc comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KDoc {
    sections: Vec<KDocSection>,
}

/// One section of a KDoc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KDocSection {
    /// `None` for the default section
    pub name: Option<String>,
    pub subject: Option<String>,
    /// Free text of the section before its first tag, trimmed
    pub content: String,
    pub tags: Vec<KDocTag>,
}

/// A block tag such as `@param name text` or `@active`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KDocTag {
    pub name: String,
    pub subject: Option<String>,
    pub content: String,
}

impl KDoc {
    /// Parse the full comment text, including the `/**` and `*/` delimiters
    pub fn parse(text: &str) -> Self {
        let body = text.strip_prefix("/**").unwrap_or(text);
        let body = body.strip_suffix("*/").unwrap_or(body);

        let mut sections = Vec::new();
        let mut current = SectionBuilder::default();
        let mut in_code_block = false;

        for line in body.lines().map(strip_leading_asterisk) {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                current.push_line(line);
                continue;
            }

            match tag_line(line).filter(|_| !in_code_block) {
                Some((name, rest)) => {
                    let (subject, content) = split_subject(name, rest);
                    if SECTION_TAGS.contains(&name) {
                        let next = SectionBuilder::new(name, subject, content);
                        sections.push(std::mem::replace(&mut current, next).build());
                    } else {
                        current.start_tag(name, subject, content);
                    }
                }
                None => current.push_line(line),
            }
        }
        sections.push(current.build());

        Self { sections }
    }

    /// The section before any `@constructor` or `@property` tag
    pub fn default_section(&self) -> &KDocSection {
        &self.sections[0]
    }

    pub fn sections(&self) -> &[KDocSection] {
        &self.sections
    }
}

impl KDocSection {
    /// First tag with the given name in this section
    pub fn find_tag_by_name(&self, name: &str) -> Option<&KDocTag> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.find_tag_by_name(name).is_some()
    }
}

#[derive(Default)]
struct SectionBuilder {
    name: Option<String>,
    subject: Option<String>,
    lines: Vec<String>,
    tags: Vec<TagBuilder>,
}

struct TagBuilder {
    name: String,
    subject: Option<String>,
    lines: Vec<String>,
}

impl SectionBuilder {
    fn new(name: &str, subject: Option<&str>, content: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            subject: subject.map(str::to_string),
            lines: vec![content.to_string()],
            tags: Vec::new(),
        }
    }

    fn start_tag(&mut self, name: &str, subject: Option<&str>, content: &str) {
        self.tags.push(TagBuilder {
            name: name.to_string(),
            subject: subject.map(str::to_string),
            lines: vec![content.to_string()],
        });
    }

    /// Continuation text goes to the open tag, or to the section itself
    fn push_line(&mut self, line: &str) {
        match self.tags.last_mut() {
            Some(tag) => tag.lines.push(line.to_string()),
            None => self.lines.push(line.to_string()),
        }
    }

    fn build(self) -> KDocSection {
        KDocSection {
            name: self.name,
            subject: self.subject,
            content: join_lines(&self.lines),
            tags: self
                .tags
                .into_iter()
                .map(|tag| KDocTag {
                    name: tag.name,
                    subject: tag.subject,
                    content: join_lines(&tag.lines),
                })
                .collect(),
        }
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// Drop indentation, one leading `*` and the single space after it
fn strip_leading_asterisk(line: &str) -> &str {
    let line = line.trim_start();
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

/// Split `@name rest` into its tag name and remainder
fn tag_line(line: &str) -> Option<(&str, &str)> {
    let after_at = line.trim_start().strip_prefix('@')?;
    let end = after_at
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(after_at.len());
    if end == 0 {
        return None;
    }
    Some((&after_at[..end], after_at[end..].trim()))
}

/// Tags like `@param` take their first word as subject; `[Name]` links are unwrapped
fn split_subject<'a>(name: &str, rest: &'a str) -> (Option<&'a str>, &'a str) {
    if !SUBJECT_TAGS.contains(&name) || rest.is_empty() {
        return (None, rest);
    }
    let (word, content) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let subject = word.trim_start_matches('[').trim_end_matches(']');
    (Some(subject), content.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_comment() {
        let doc = KDoc::parse("/** Foo rules */");
        let section = doc.default_section();

        assert_eq!(section.name, None);
        assert_eq!(section.content, "Foo rules");
        assert!(section.tags.is_empty());
        assert_eq!(doc.sections().len(), 1);
    }

    #[test]
    fn test_multi_line_content_and_tags() {
        let doc = KDoc::parse(
            "/**\n * The style rule set contains rules that assert\n *   a consistent code style.\n *\n * @active since v1.0.0\n * @author someone\n *   else\n */",
        );
        let section = doc.default_section();

        assert_eq!(
            section.content,
            "The style rule set contains rules that assert\n  a consistent code style."
        );
        let active = section.find_tag_by_name("active").unwrap();
        assert_eq!(active.content, "since v1.0.0");
        assert_eq!(active.subject, None);

        let author = section.find_tag_by_name("author").unwrap();
        assert_eq!(author.content, "someone\n  else");
        assert!(!section.has_tag("inactive"));
    }

    #[test]
    fn test_empty_comment() {
        let doc = KDoc::parse("/***/");
        assert_eq!(doc.default_section().content, "");

        let doc = KDoc::parse("/**\n *\n */");
        assert_eq!(doc.default_section().content, "");
    }

    #[test]
    fn test_subject_tags() {
        let doc = KDoc::parse(
            "/**\n * Summary\n * @param config the rule set config\n * @see [RuleSet]\n * @throws IllegalStateException when broken\n */",
        );
        let section = doc.default_section();

        let param = section.find_tag_by_name("param").unwrap();
        assert_eq!(param.subject.as_deref(), Some("config"));
        assert_eq!(param.content, "the rule set config");

        let see = section.find_tag_by_name("see").unwrap();
        assert_eq!(see.subject.as_deref(), Some("RuleSet"));
        assert_eq!(see.content, "");

        let throws = section.find_tag_by_name("throws").unwrap();
        assert_eq!(throws.subject.as_deref(), Some("IllegalStateException"));
    }

    #[test]
    fn test_section_tags_split_sections() {
        let doc = KDoc::parse(
            "/**\n * Provider docs\n * @constructor builds it\n * @active\n * @property id the id\n */",
        );

        assert_eq!(doc.sections().len(), 3);
        assert_eq!(doc.default_section().content, "Provider docs");
        assert!(!doc.default_section().has_tag("active"));

        let constructor = &doc.sections()[1];
        assert_eq!(constructor.name.as_deref(), Some("constructor"));
        assert_eq!(constructor.content, "builds it");
        assert!(constructor.has_tag("active"));

        let property = &doc.sections()[2];
        assert_eq!(property.name.as_deref(), Some("property"));
        assert_eq!(property.subject.as_deref(), Some("id"));
        assert_eq!(property.content, "the id");
    }

    #[test]
    fn test_tags_inside_code_block_are_text() {
        let doc = KDoc::parse("/**\n * Usage:\n * ```\n * @active\n * ```\n */");
        let section = doc.default_section();

        assert!(!section.has_tag("active"));
        assert_eq!(section.content, "Usage:\n```\n@active\n```");
    }

    #[test]
    fn test_inline_at_is_not_a_tag() {
        let doc = KDoc::parse("/** Mail me at me@example.com or use @ alone */");
        let section = doc.default_section();

        assert!(section.tags.is_empty());
        assert_eq!(section.content, "Mail me at me@example.com or use @ alone");
    }

    #[test]
    fn test_repeated_tags() {
        let doc = KDoc::parse("/**\n * @param a first\n * @param b second\n */");
        let names: Vec<_> = doc
            .default_section()
            .tags
            .iter()
            .filter(|tag| tag.name == "param")
            .filter_map(|tag| tag.subject.as_deref())
            .collect();

        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.default_section().content, "");
    }
}
