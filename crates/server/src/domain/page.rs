use chrono::{DateTime, Utc};

use super::{next_edit_time, DatabaseId, DomainError, DomainResult, PageId, PropertyMap};

/// A page (database record) in the remote workspace.
///
/// Equality is by id only.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    parent_database_id: Option<DatabaseId>,
    properties: PropertyMap,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    archived: bool,
}

impl Page {
    pub fn new(
        id: PageId,
        parent_database_id: Option<DatabaseId>,
        properties: PropertyMap,
        created_time: DateTime<Utc>,
        last_edited_time: DateTime<Utc>,
    ) -> Self {
        Self { id, parent_database_id, properties, created_time, last_edited_time, archived: false }
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    /// Owning database, absent when the page lives under another parent kind.
    pub fn parent_database_id(&self) -> Option<&DatabaseId> {
        self.parent_database_id.as_ref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
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

    /// Shallow merge of `partial` into the current properties.
    pub fn update_properties(&mut self, partial: PropertyMap) {
        self.properties.extend(partial);
        self.touch();
    }

    pub fn archive(&mut self) -> DomainResult<()> {
        if self.archived {
            return Err(DomainError::AlreadyArchived { entity: "Page" });
        }
        self.archived = true;
        self.touch();
        Ok(())
    }

    pub fn restore(&mut self) -> DomainResult<()> {
        if !self.archived {
            return Err(DomainError::NotArchived { entity: "Page" });
        }
        self.archived = false;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.last_edited_time = next_edit_time(self.last_edited_time);
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Page {}
