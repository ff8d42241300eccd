use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Placeholder title for an entity whose first attribute is empty or missing.
pub const UNTITLED_LABEL: &str = "Untitled";
/// Placeholder shown when an entity references a type that no longer exists.
pub const UNKNOWN_TYPE_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub String);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttrId(pub String);

impl fmt::Display for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of value an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Int,
    Decimal,
    Link,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Text => "text",
            AttributeKind::Int => "int",
            AttributeKind::Decimal => "decimal",
            AttributeKind::Link => "link",
        }
    }
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone)]
pub enum EnumConversionError {
    #[error("Invalid AttributeKind value: {0}")]
    InvalidAttributeKind(String),
}

impl TryFrom<&str> for AttributeKind {
    type Error = EnumConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "text" => Ok(AttributeKind::Text),
            "int" => Ok(AttributeKind::Int),
            "decimal" => Ok(AttributeKind::Decimal),
            "link" => Ok(AttributeKind::Link),
            _ => Err(EnumConversionError::InvalidAttributeKind(value.to_string())),
        }
    }
}

/// One attribute declaration within a type. `target_type_id` is only
/// meaningful for `AttributeKind::Link`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttrId,
    pub name: String,
    pub kind: AttributeKind,
    pub target_type_id: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: TypeId,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// An attribute value. Numeric-looking text decodes to `Number` on load;
/// everything else stays text. Link values hold the target entity id as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Parse text the way the XML loader does: non-empty numeric text
    /// becomes a number, everything else stays text.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Value::Text(String::new());
        }
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(t) if t.is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(t) => write!(f, "{}", t),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub type_id: TypeId,
    pub values: BTreeMap<AttrId, Value>,
}

impl Entity {
    pub fn value(&self, attr: &AttrId) -> Option<&Value> {
        self.values.get(attr)
    }
}

/// The full document: ordered type declarations and ordered entity records.
/// Treated as an immutable snapshot by the views; every mutation goes through
/// the helpers here and bumps the owning shell's revision counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub types: Vec<EntityType>,
    pub entities: Vec<Entity>,
}

impl AppData {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.entities.is_empty()
    }

    pub fn type_by_id(&self, id: &TypeId) -> Option<&EntityType> {
        self.types.iter().find(|t| &t.id == id)
    }

    pub fn entity_by_id(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    pub fn entity_by_id_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| &e.id == id)
    }

    /// Display title of an entity: the value of its type's first-declared
    /// attribute, or [`UNTITLED_LABEL`] when the type is gone, declares no
    /// attributes, or the value is absent/empty.
    pub fn entity_title(&self, entity: &Entity) -> String {
        let first_attr = self
            .type_by_id(&entity.type_id)
            .and_then(|t| t.attributes.first());
        match first_attr.and_then(|a| entity.value(&a.id)) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => UNTITLED_LABEL.to_string(),
        }
    }

    /// Display name of an entity's type, tolerating dangling references.
    pub fn type_label(&self, entity: &Entity) -> String {
        self.type_by_id(&entity.type_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_TYPE_LABEL.to_string())
    }

    /// Replace the entity with a matching id, or append it.
    pub fn upsert_entity(&mut self, entity: Entity) {
        if let Some(existing) = self.entities.iter_mut().find(|e| e.id == entity.id) {
            *existing = entity;
        } else {
            self.entities.push(entity);
        }
    }

    pub fn delete_entity(&mut self, id: &EntityId) {
        self.entities.retain(|e| &e.id != id);
    }

    pub fn entities_of_type(&self, type_id: &TypeId) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| &e.type_id == type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppData {
        let t = EntityType {
            id: TypeId("t1".into()),
            name: "Task".into(),
            attributes: vec![
                Attribute {
                    id: AttrId("a1".into()),
                    name: "Title".into(),
                    kind: AttributeKind::Text,
                    target_type_id: None,
                },
                Attribute {
                    id: AttrId("a2".into()),
                    name: "Priority".into(),
                    kind: AttributeKind::Int,
                    target_type_id: None,
                },
            ],
        };
        let e = Entity {
            id: EntityId("e1".into()),
            type_id: TypeId("t1".into()),
            values: BTreeMap::from([
                (AttrId("a1".into()), Value::Text("Wire up backend".into())),
                (AttrId("a2".into()), Value::Number(1.0)),
            ]),
        };
        AppData {
            types: vec![t],
            entities: vec![e],
        }
    }

    #[test]
    fn entity_title_uses_first_declared_attribute() {
        let data = sample();
        assert_eq!(data.entity_title(&data.entities[0]), "Wire up backend");
    }

    #[test]
    fn entity_title_falls_back_when_value_missing() {
        let mut data = sample();
        data.entities[0].values.remove(&AttrId("a1".into()));
        assert_eq!(data.entity_title(&data.entities[0]), UNTITLED_LABEL);
    }

    #[test]
    fn type_label_tolerates_dangling_type() {
        let mut data = sample();
        data.types.clear();
        assert_eq!(data.type_label(&data.entities[0]), UNKNOWN_TYPE_LABEL);
        assert_eq!(data.entity_title(&data.entities[0]), UNTITLED_LABEL);
    }

    #[test]
    fn upsert_replaces_by_id_and_appends_new() {
        let mut data = sample();
        let mut updated = data.entities[0].clone();
        updated
            .values
            .insert(AttrId("a1".into()), Value::Text("Renamed".into()));
        data.upsert_entity(updated);
        assert_eq!(data.entities.len(), 1);
        assert_eq!(data.entity_title(&data.entities[0]), "Renamed");

        let fresh = Entity {
            id: EntityId("e2".into()),
            type_id: TypeId("t1".into()),
            values: BTreeMap::new(),
        };
        data.upsert_entity(fresh);
        assert_eq!(data.entities.len(), 2);
    }

    #[test]
    fn delete_removes_entity() {
        let mut data = sample();
        data.delete_entity(&EntityId("e1".into()));
        assert!(data.entities.is_empty());
    }

    #[test]
    fn value_parse_is_lenient() {
        assert_eq!(Value::parse("3"), Value::Number(3.0));
        assert_eq!(Value::parse("3.5"), Value::Number(3.5));
        assert_eq!(Value::parse("three"), Value::Text("three".into()));
        assert_eq!(Value::parse(""), Value::Text(String::new()));
    }

    #[test]
    fn attribute_kind_round_trips_through_str() {
        for kind in [
            AttributeKind::Text,
            AttributeKind::Int,
            AttributeKind::Decimal,
            AttributeKind::Link,
        ] {
            assert_eq!(AttributeKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(AttributeKind::try_from("blob").is_err());
    }
}
