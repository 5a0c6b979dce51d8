// ── Stream descriptor ──
//
// Parsed form of a stream's XML info document. Created once when a
// handle is opened and never mutated afterwards.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xmltree::Element;

use super::identity::StreamInfo;
use super::resolved::ResolvedStream;

/// Why an info document could not be turned into a descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("expected <info> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("missing <{0}> element")]
    MissingField(&'static str),

    #[error("invalid <{field}> value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// Metadata of one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub channel_count: u32,
    /// Sample value format as reported by the outlet (e.g. `float32`).
    pub channel_format: String,
    /// Nominal sample rate in Hz. `0` means irregular rate.
    pub nominal_srate: f64,
    pub source_id: String,
    pub hostname: String,
    pub uid: String,
    pub session_id: String,
    /// Protocol version of the publishing library.
    pub version: f64,
    /// Outlet creation time on the publisher's clock, in seconds.
    pub created_at: f64,
    pub v4address: Option<String>,
    pub v4data_port: Option<u16>,
    pub v4service_port: Option<u16>,
    /// Free-form `<desc>` tree, if the outlet published one.
    pub description: Option<Description>,
    /// Set when the info document was unusable and this descriptor was
    /// built from the resolution record instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
}

/// The `<desc>` element of an info document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// One map per `<channels><channel>` element, keyed by child element
    /// name. Nested elements flatten to dotted keys (`location.X`).
    pub channels: Vec<IndexMap<String, String>>,
    /// Every other child of `<desc>`, in document order.
    pub entries: Vec<DescEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescEntry {
    pub key: String,
    pub value: DescValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescValue {
    Text(String),
    Group(Vec<DescEntry>),
}

impl StreamDescriptor {
    /// Parse an info document (`<info>…</info>`).
    pub fn from_xml(xml: &str) -> Result<Self, MetadataError> {
        let root = Element::parse(xml.as_bytes()).map_err(|e| MetadataError::Xml(e.to_string()))?;
        if root.name != "info" {
            return Err(MetadataError::UnexpectedRoot(root.name));
        }

        Ok(Self {
            name: child_text(&root, "name").ok_or(MetadataError::MissingField("name"))?,
            stream_type: child_text(&root, "type").unwrap_or_default(),
            channel_count: child_number(&root, "channel_count")?.unwrap_or(0),
            channel_format: child_text(&root, "channel_format").unwrap_or_default(),
            nominal_srate: child_number(&root, "nominal_srate")?.unwrap_or(0.0),
            source_id: child_text(&root, "source_id").unwrap_or_default(),
            hostname: child_text(&root, "hostname").unwrap_or_default(),
            uid: child_text(&root, "uid").unwrap_or_default(),
            session_id: child_text(&root, "session_id").unwrap_or_default(),
            version: child_number(&root, "version")?.unwrap_or(0.0),
            created_at: child_number(&root, "created_at")?.unwrap_or(0.0),
            v4address: child_text(&root, "v4address"),
            v4data_port: child_number(&root, "v4data_port")?,
            v4service_port: child_number(&root, "v4service_port")?,
            description: root.get_child("desc").and_then(parse_description),
            metadata_error: None,
        })
    }

    /// Descriptor for a stream whose info document was unusable: the
    /// resolution fields are kept, everything else is empty.
    pub fn degraded(stream: &ResolvedStream, reason: impl Into<String>) -> Self {
        Self {
            name: stream.name.clone(),
            stream_type: stream.stream_type.clone(),
            channel_count: stream.channel_count,
            channel_format: String::new(),
            nominal_srate: stream.nominal_srate,
            source_id: stream.source_id.clone(),
            hostname: stream.hostname.clone(),
            uid: stream.uid.clone(),
            session_id: String::new(),
            version: 0.0,
            created_at: 0.0,
            v4address: None,
            v4data_port: None,
            v4service_port: None,
            description: None,
            metadata_error: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.metadata_error.is_some()
    }
}

impl StreamInfo for StreamDescriptor {
    fn name(&self) -> &str {
        &self.name
    }
}

// ── XML helpers ─────────────────────────────────────────────────────

/// Trimmed text of a direct child. Empty elements count as absent.
fn child_text(parent: &Element, name: &str) -> Option<String> {
    let text = parent.get_child(name)?.get_text()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn child_number<T: FromStr>(
    parent: &Element,
    field: &'static str,
) -> Result<Option<T>, MetadataError> {
    child_text(parent, field)
        .map(|raw| {
            raw.parse()
                .map_err(|_| MetadataError::InvalidField { field, value: raw })
        })
        .transpose()
}

fn child_elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|node| node.as_element())
}

fn parse_description(desc: &Element) -> Option<Description> {
    let mut description = Description::default();

    for child in child_elements(desc) {
        if child.name == "channels" {
            description.channels = child_elements(child)
                .filter(|c| c.name == "channel")
                .map(|channel| {
                    let mut fields = IndexMap::new();
                    flatten_into(&mut fields, None, channel);
                    fields
                })
                .collect();
        } else {
            description.entries.push(DescEntry {
                key: child.name.clone(),
                value: desc_value(child),
            });
        }
    }

    (!description.channels.is_empty() || !description.entries.is_empty()).then_some(description)
}

fn desc_value(element: &Element) -> DescValue {
    let children: Vec<DescEntry> = child_elements(element)
        .map(|child| DescEntry {
            key: child.name.clone(),
            value: desc_value(child),
        })
        .collect();

    if children.is_empty() {
        DescValue::Text(
            element
                .get_text()
                .map(|t| t.trim().to_owned())
                .unwrap_or_default(),
        )
    } else {
        DescValue::Group(children)
    }
}

fn flatten_into(fields: &mut IndexMap<String, String>, prefix: Option<&str>, element: &Element) {
    for child in child_elements(element) {
        let key = match prefix {
            Some(p) => format!("{p}.{}", child.name),
            None => child.name.clone(),
        };
        if child_elements(child).next().is_some() {
            flatten_into(fields, Some(&key), child);
        } else {
            let text = child
                .get_text()
                .map(|t| t.trim().to_owned())
                .unwrap_or_default();
            fields.insert(key, text);
        }
    }
}
