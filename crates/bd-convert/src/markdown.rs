//! Default markdown converter.
//!
//! [`MarkdownConverter`] renders CommonMark (with GFM tables, strikethrough,
//! task lists and `[[wiki]]` links) to HTML, and extracts:
//! - outbound link targets, in document order, as authored
//! - the title (front matter `title`, else the first H1)
//! - tags from YAML front matter (`tags`, or its alias `filetags`)
//!
//! # Front Matter
//!
//! ```text
//! ---
//! title: Rust notes
//! tags: [rust, nopub]
//! ---
//! ```
//!
//! `tags` may also be a single string (`tags: ":rust:nopub:"`).

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag as MdTag, TagEnd, html};
use serde::Deserialize;

use crate::converter::{Content, Conversion, ConvertError, Converter};
use crate::tags::{Tag, Tags};

/// Front matter fields the converter understands. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    #[serde(alias = "filetags")]
    tags: Option<TagList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagList {
    Many(Vec<String>),
    One(String),
}

impl FrontMatter {
    fn parse(yaml: &str) -> Result<Self, ConvertError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn tags(&self) -> Tags {
        match &self.tags {
            Some(TagList::Many(items)) => items.iter().filter_map(|t| Tag::parse(t)).collect(),
            Some(TagList::One(line)) => Tags::parse_line(line),
            None => Tags::new(),
        }
    }
}

/// State collected while streaming parser events.
#[derive(Default)]
struct EventScan {
    in_metadata: bool,
    metadata: String,
    heading: Option<String>,
    title: Option<String>,
    links: Vec<String>,
}

impl EventScan {
    /// Record what the event carries. Returns `false` for events that must
    /// not reach the HTML writer (the front matter block).
    fn observe(&mut self, event: &Event<'_>) -> bool {
        match event {
            Event::Start(MdTag::MetadataBlock(_)) => {
                self.in_metadata = true;
                false
            }
            Event::End(TagEnd::MetadataBlock(_)) => {
                self.in_metadata = false;
                false
            }
            Event::Text(text) if self.in_metadata => {
                self.metadata.push_str(text);
                false
            }
            _ if self.in_metadata => false,
            Event::Start(MdTag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if self.title.is_none() => {
                self.heading = Some(String::new());
                true
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(text) = self.heading.take() {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.title = Some(text.to_owned());
                    }
                }
                true
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = &mut self.heading {
                    heading.push_str(text);
                }
                true
            }
            Event::Start(MdTag::Link { dest_url, .. }) => {
                if !dest_url.is_empty() {
                    self.links.push(dest_url.to_string());
                }
                true
            }
            _ => true,
        }
    }
}

/// Markdown to HTML converter.
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    options: Options,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with GFM extensions, wiki links and front matter enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_WIKILINKS
                | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS,
        }
    }
}

impl Converter for MarkdownConverter {
    fn convert(&self, raw: &str) -> Result<Conversion, ConvertError> {
        let mut scan = EventScan::default();
        let events: Vec<Event<'_>> = Parser::new_ext(raw, self.options)
            .filter(|event| scan.observe(event))
            .collect();

        let front_matter = FrontMatter::parse(&scan.metadata)?;

        let mut output = String::with_capacity(raw.len() + raw.len() / 2);
        html::push_html(&mut output, events.into_iter());

        let tags = front_matter.tags();
        Ok(Conversion {
            content: Content {
                title: front_matter.title.or(scan.title),
                html: output,
            },
            links: scan.links,
            tags,
        })
    }
}
