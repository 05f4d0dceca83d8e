use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{next_edit_time, DatabaseId, DomainError, DomainResult, PropertyMap};

/// Property name → descriptor.
pub type DatabaseSchema = BTreeMap<String, PropertyDescriptor>;

/// One column of a database schema. Type-specific configuration is kept
/// opaque in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl PropertyDescriptor {
    /// Reads a descriptor from a remote schema entry. A missing `name` falls
    /// back to the schema key; anything that is not an object is kept in
    /// `extra` under `value`.
    pub fn from_value(key: &str, value: Value) -> Self {
        let mut descriptor = match value {
            Value::Object(map) => serde_json::from_value(Value::Object(map.clone()))
                .unwrap_or_else(|_| Self::bare(map)),
            other => {
                let mut extra = PropertyMap::new();
                extra.insert("value".to_string(), other);
                Self::bare(extra)
            }
        };
        if descriptor.name.is_empty() {
            descriptor.name = key.to_string();
        }
        descriptor
    }

    fn bare(extra: PropertyMap) -> Self {
        Self { id: String::new(), name: String::new(), kind: String::new(), extra }
    }
}

/// Builds a typed schema from an opaque `{name: descriptor}` payload.
pub fn schema_from_map(map: PropertyMap) -> DatabaseSchema {
    map.into_iter()
        .map(|(key, value)| {
            let descriptor = PropertyDescriptor::from_value(&key, value);
            (key, descriptor)
        })
        .collect()
}

/// A database in the remote workspace. Equality is by id only.
#[derive(Debug, Clone)]
pub struct Database {
    id: DatabaseId,
    title: String,
    schema: DatabaseSchema,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    archived: bool,
}

impl Database {
    pub fn new(
        id: DatabaseId,
        title: impl Into<String>,
        schema: DatabaseSchema,
        created_time: DateTime<Utc>,
        last_edited_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            schema,
            created_time,
            last_edited_time,
            archived: false,
        }
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn id(&self) -> &DatabaseId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema(&self) -> &DatabaseSchema {
        &self.schema
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    pub fn last_edited_time(&self) -> DateTime<Utc> {
        self.last_edited_time
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    pub fn update_title(&mut self, title: impl Into<String>) -> DomainResult<()> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        self.title = title;
        self.touch();
        Ok(())
    }

    /// Shallow merge by property name.
    pub fn update_schema(&mut self, partial: DatabaseSchema) {
        self.schema.extend(partial);
        self.touch();
    }

    pub fn archive(&mut self) -> DomainResult<()> {
        if self.archived {
            return Err(DomainError::AlreadyArchived { entity: "Database" });
        }
        self.archived = true;
        self.touch();
        Ok(())
    }

    pub fn restore(&mut self) -> DomainResult<()> {
        if !self.archived {
            return Err(DomainError::NotArchived { entity: "Database" });
        }
        self.archived = false;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.last_edited_time = next_edit_time(self.last_edited_time);
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Database {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const DATABASE: &str = "123e4567e89b12d3a456426614174000";

    fn descriptor(id: &str, name: &str, kind: &str) -> PropertyDescriptor {
        PropertyDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            extra: PropertyMap::new(),
        }
    }

    fn sample_database() -> Database {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let schema: DatabaseSchema = [
            ("A".to_string(), descriptor("a", "A", "title")),
            ("B".to_string(), descriptor("b", "B", "number")),
        ]
        .into_iter()
        .collect();
        Database::new(DatabaseId::new(DATABASE).unwrap(), "Tasks", schema, created, created)
    }

    #[test]
    fn update_title_rejects_blank_titles() {
        let mut database = sample_database();
        for blank in ["", "   ", "\t\n"] {
            assert_eq!(database.update_title(blank), Err(DomainError::EmptyTitle));
        }
        assert_eq!(database.title(), "Tasks");
    }

    #[test]
    fn update_title_sets_title_and_advances_time() {
        let mut database = sample_database();
        let before = database.last_edited_time();
        database.update_title("Projects").unwrap();
        assert_eq!(database.title(), "Projects");
        assert!(database.last_edited_time() > before);
    }

    #[test]
    fn update_schema_merges_by_name() {
        let mut database = sample_database();
        let before = database.last_edited_time();
        let partial: DatabaseSchema = [
            ("B".to_string(), descriptor("b", "B", "select")),
            ("C".to_string(), descriptor("c", "C", "date")),
        ]
        .into_iter()
        .collect();

        database.update_schema(partial);

        let kinds: Vec<(&str, &str)> =
            database.schema().iter().map(|(k, d)| (k.as_str(), d.kind.as_str())).collect();
        assert_eq!(kinds, vec![("A", "title"), ("B", "select"), ("C", "date")]);
        assert!(database.last_edited_time() > before);
    }

    #[test]
    fn archive_lifecycle_mirrors_pages() {
        let mut database = sample_database();
        let created = database.last_edited_time();
        assert_eq!(database.restore(), Err(DomainError::NotArchived { entity: "Database" }));
        assert_eq!(database.last_edited_time(), created);

        database.archive().unwrap();
        let archived_at = database.last_edited_time();
        assert!(archived_at > created);
        assert_eq!(database.archive(), Err(DomainError::AlreadyArchived { entity: "Database" }));
        assert_eq!(database.last_edited_time(), archived_at);

        database.restore().unwrap();
        assert!(!database.archived());
        assert!(database.last_edited_time() > archived_at);
    }

    #[test]
    fn equality_ignores_everything_but_id() {
        let database = sample_database();
        let renamed = Database::new(
            DatabaseId::new("123e4567-e89b-12d3-a456-426614174000").unwrap(),
            "Other",
            DatabaseSchema::new(),
            Utc::now(),
            Utc::now(),
        );
        assert_eq!(database, renamed);
    }

    #[test]
    fn descriptor_keeps_type_specific_configuration() {
        let descriptor = PropertyDescriptor::from_value(
            "Status",
            json!({
                "id": "abc",
                "name": "Status",
                "type": "select",
                "select": { "options": [{ "name": "Done" }] }
            }),
        );
        assert_eq!(descriptor.kind, "select");
        assert_eq!(descriptor.extra.get("select"), Some(&json!({ "options": [{ "name": "Done" }] })));

        let encoded = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(encoded["type"], "select");
        assert_eq!(encoded["select"]["options"][0]["name"], "Done");
    }

    #[test]
    fn descriptor_name_falls_back_to_key() {
        let descriptor =
            PropertyDescriptor::from_value("Priority", json!({ "select": { "options": [] } }));
        assert_eq!(descriptor.name, "Priority");
        assert!(descriptor.id.is_empty());
        assert!(descriptor.extra.contains_key("select"));
    }
}
