//! XML persistence for the entity document.
//!
//! The on-disk format is a single `<DataManager>` file with a `<Types>`
//! section of declarations followed by an `<Entities>` section of records:
//!
//! ```xml
//! <DataManager>
//!   <Types>
//!     <Type id="t1" name="Task">
//!       <Attribute id="a1" name="Title" type="text"/>
//!       <Attribute id="a2" name="Blocks" type="link" target="t1"/>
//!     </Type>
//!   </Types>
//!   <Entities>
//!     <Entity id="e1" typeId="t1">
//!       <Value attrId="a1">Wire up backend</Value>
//!     </Entity>
//!   </Entities>
//! </DataManager>
//! ```

use entimap_core::{
    AppData, AttrId, Attribute, AttributeKind, Entity, EntityId, EntityType, TypeId, Value,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to access data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data file: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),
}

/// Handle on the XML document at a fixed path.
pub struct XmlStore {
    path: PathBuf,
}

impl XmlStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document. A missing file is a fresh start, not
    /// an error.
    pub fn load(&self) -> Result<AppData, StorageError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(AppData::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        from_xml(&text)
    }

    /// Encode and write the whole document.
    pub fn save(&self, data: &AppData) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, to_xml(data))?;
        Ok(())
    }
}

/// Serialize the document. Hand-written because the format is flat and
/// attribute-heavy; no serializer crate pays its way here.
pub fn to_xml(data: &AppData) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<DataManager>\n");

    out.push_str("  <Types>\n");
    for ty in &data.types {
        let _ = writeln!(
            out,
            "    <Type id=\"{}\" name=\"{}\">",
            escape(&ty.id.0),
            escape(&ty.name)
        );
        for attr in &ty.attributes {
            let _ = write!(
                out,
                "      <Attribute id=\"{}\" name=\"{}\" type=\"{}\"",
                escape(&attr.id.0),
                escape(&attr.name),
                attr.kind.as_str()
            );
            if let Some(target) = &attr.target_type_id {
                let _ = write!(out, " target=\"{}\"", escape(&target.0));
            }
            out.push_str("/>\n");
        }
        out.push_str("    </Type>\n");
    }
    out.push_str("  </Types>\n");

    out.push_str("  <Entities>\n");
    for entity in &data.entities {
        let _ = writeln!(
            out,
            "    <Entity id=\"{}\" typeId=\"{}\">",
            escape(&entity.id.0),
            escape(&entity.type_id.0)
        );
        for (attr_id, value) in &entity.values {
            let _ = writeln!(
                out,
                "      <Value attrId=\"{}\">{}</Value>",
                escape(&attr_id.0),
                escape(&value.to_string())
            );
        }
        out.push_str("    </Entity>\n");
    }
    out.push_str("  </Entities>\n");

    out.push_str("</DataManager>\n");
    out
}

/// Decode a document. Tolerant of what it can be: unknown attribute kinds
/// fall back to text and unrecognized child elements are skipped.
pub fn from_xml(text: &str) -> Result<AppData, StorageError> {
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().name() != "DataManager" {
        return Err(StorageError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let mut data = AppData::default();

    if let Some(types) = child_named(root, "Types") {
        for node in types.children().filter(|n| n.has_tag_name("Type")) {
            data.types.push(parse_type(node));
        }
    }

    if let Some(entities) = child_named(root, "Entities") {
        for node in entities.children().filter(|n| n.has_tag_name("Entity")) {
            data.entities.push(parse_entity(node));
        }
    }

    Ok(data)
}

fn child_named<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn parse_type(node: roxmltree::Node<'_, '_>) -> EntityType {
    let attributes = node
        .children()
        .filter(|n| n.has_tag_name("Attribute"))
        .map(|attr| {
            let raw_kind = attr.attribute("type").unwrap_or("text");
            let kind = AttributeKind::try_from(raw_kind).unwrap_or_else(|err| {
                tracing::warn!("{err}, treating attribute as text");
                AttributeKind::Text
            });
            Attribute {
                id: AttrId(attr.attribute("id").unwrap_or_default().to_string()),
                name: attr.attribute("name").unwrap_or_default().to_string(),
                kind,
                target_type_id: attr.attribute("target").map(|t| TypeId(t.to_string())),
            }
        })
        .collect();

    EntityType {
        id: TypeId(node.attribute("id").unwrap_or_default().to_string()),
        name: node.attribute("name").unwrap_or_default().to_string(),
        attributes,
    }
}

fn parse_entity(node: roxmltree::Node<'_, '_>) -> Entity {
    let mut values = BTreeMap::new();
    for value in node.children().filter(|n| n.has_tag_name("Value")) {
        let attr_id = AttrId(value.attribute("attrId").unwrap_or_default().to_string());
        values.insert(attr_id, Value::parse(value.text().unwrap_or_default()));
    }
    Entity {
        id: EntityId(node.attribute("id").unwrap_or_default().to_string()),
        type_id: TypeId(node.attribute("typeId").unwrap_or_default().to_string()),
        values,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
