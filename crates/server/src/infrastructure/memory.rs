// In-memory workspace implementing both repository ports.
//
// Behaves like the remote API where the domain can observe it: archiving
// is idempotent, unknown ids read as `None` and fail on write, and queries
// paginate with an opaque cursor. Filters and sorts are accepted but not
// evaluated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::database::schema_from_map;
use crate::domain::repository::{
    DatabaseRepository, DatabaseUpdate, PageQueryOptions, PageQueryResult, PageRepository,
};
use crate::domain::{
    Database, DatabaseId, DatabaseSchema, DomainError, DomainResult, Page, PageId, PropertyMap,
};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Default)]
struct WorkspaceState {
    pages: Vec<Page>,
    databases: Vec<Database>,
    unavailable: bool,
}

type SharedState = Arc<Mutex<WorkspaceState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, WorkspaceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_available(state: &WorkspaceState, operation: &'static str) -> DomainResult<()> {
    if state.unavailable {
        return Err(DomainError::remote(operation, "workspace unavailable"));
    }
    Ok(())
}

fn not_found(operation: &'static str, id: &impl std::fmt::Display) -> DomainError {
    DomainError::remote(operation, format!("Could not find object with ID: {id}"))
}

/// Handle to a shared in-memory workspace. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkspace {
    state: SharedState,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> Arc<InMemoryPageRepository> {
        Arc::new(InMemoryPageRepository { state: Arc::clone(&self.state) })
    }

    pub fn databases(&self) -> Arc<InMemoryDatabaseRepository> {
        Arc::new(InMemoryDatabaseRepository { state: Arc::clone(&self.state) })
    }

    /// Makes every subsequent repository call fail as a remote error would.
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    pub fn seed_database(&self, title: &str) -> DatabaseId {
        self.seed_database_with_schema(title, DatabaseSchema::new())
    }

    pub fn seed_database_with_schema(&self, title: &str, schema: DatabaseSchema) -> DatabaseId {
        let id = new_database_id();
        let now = Utc::now();
        lock(&self.state).databases.push(Database::new(id.clone(), title, schema, now, now));
        id
    }

    /// Adds a page; `properties` must be a JSON object (anything else seeds
    /// an empty property map).
    pub fn seed_page(&self, database_id: Option<&DatabaseId>, properties: Value) -> Page {
        let properties = match properties {
            Value::Object(map) => map,
            _ => PropertyMap::new(),
        };
        let now = Utc::now();
        let page = Page::new(new_page_id(), database_id.cloned(), properties, now, now);
        lock(&self.state).pages.push(page.clone());
        page
    }

    pub fn seed_archived_page(&self, database_id: &DatabaseId, properties: Value) -> Page {
        let page = self.seed_page(Some(database_id), properties);
        let mut state = lock(&self.state);
        let stored = state
            .pages
            .iter_mut()
            .find(|candidate| candidate.id() == page.id())
            .map(|stored| {
                let _ = stored.archive();
                stored.clone()
            });
        stored.unwrap_or(page)
    }

    pub fn page_count(&self) -> usize {
        lock(&self.state).pages.len()
    }
}

fn new_page_id() -> PageId {
    PageId::from_uuid(Uuid::new_v4())
}

fn new_database_id() -> DatabaseId {
    DatabaseId::from_uuid(Uuid::new_v4())
}

#[derive(Debug, Clone)]
pub struct InMemoryPageRepository {
    state: SharedState,
}

impl PageRepository for InMemoryPageRepository {
    async fn create(&self, database_id: &DatabaseId, properties: PropertyMap) -> DomainResult<Page> {
        let mut state = lock(&self.state);
        ensure_available(&state, "create page")?;
        if !state.databases.iter().any(|database| database.id() == database_id) {
            return Err(not_found("create page", database_id));
        }

        let now = Utc::now();
        let page = Page::new(new_page_id(), Some(database_id.clone()), properties, now, now);
        state.pages.push(page.clone());
        Ok(page)
    }

    async fn find_by_id(&self, id: &PageId) -> DomainResult<Option<Page>> {
        let state = lock(&self.state);
        ensure_available(&state, "retrieve page")?;
        Ok(state.pages.iter().find(|page| page.id() == id).cloned())
    }

    async fn query(
        &self,
        database_id: &DatabaseId,
        options: PageQueryOptions,
    ) -> DomainResult<PageQueryResult> {
        let state = lock(&self.state);
        ensure_available(&state, "query pages")?;

        let offset = match options.start_cursor.as_deref() {
            None => 0,
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| DomainError::remote("query pages", format!("invalid cursor: {cursor}")))?,
        };
        let page_size = options
            .page_size
            .map_or(DEFAULT_PAGE_SIZE, |size| (size as usize).clamp(1, DEFAULT_PAGE_SIZE));

        let matching: Vec<&Page> = state
            .pages
            .iter()
            .filter(|page| page.parent_database_id() == Some(database_id))
            .collect();
        let end = offset.saturating_add(page_size).min(matching.len());
        let pages = matching.get(offset..end).unwrap_or_default().iter().map(|p| (*p).clone()).collect();
        let has_more = end < matching.len();

        Ok(PageQueryResult { pages, has_more, next_cursor: has_more.then(|| end.to_string()) })
    }

    async fn update(&self, id: &PageId, properties: PropertyMap) -> DomainResult<Page> {
        let mut state = lock(&self.state);
        ensure_available(&state, "update page")?;
        let page = state
            .pages
            .iter_mut()
            .find(|page| page.id() == id)
            .ok_or_else(|| not_found("update page", id))?;
        page.update_properties(properties);
        Ok(page.clone())
    }

    async fn archive(&self, id: &PageId) -> DomainResult<()> {
        let mut state = lock(&self.state);
        ensure_available(&state, "archive page")?;
        let page = state
            .pages
            .iter_mut()
            .find(|page| page.id() == id)
            .ok_or_else(|| not_found("archive page", id))?;
        if !page.archived() {
            page.archive()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryDatabaseRepository {
    state: SharedState,
}

impl DatabaseRepository for InMemoryDatabaseRepository {
    async fn find_by_id(&self, id: &DatabaseId) -> DomainResult<Option<Database>> {
        let state = lock(&self.state);
        ensure_available(&state, "retrieve database")?;
        Ok(state.databases.iter().find(|database| database.id() == id).cloned())
    }

    async fn find_all(&self) -> DomainResult<Vec<Database>> {
        let state = lock(&self.state);
        ensure_available(&state, "retrieve databases")?;
        Ok(state.databases.clone())
    }

    async fn update(&self, id: &DatabaseId, update: DatabaseUpdate) -> DomainResult<Database> {
        let mut state = lock(&self.state);
        ensure_available(&state, "update database")?;
        let database = state
            .databases
            .iter_mut()
            .find(|database| database.id() == id)
            .ok_or_else(|| not_found("update database", id))?;

        if let Some(title) = update.title.filter(|title| !title.trim().is_empty()) {
            database.update_title(title)?;
        }
        if let Some(schema) = update.schema {
            database.update_schema(schema_from_map(schema));
        }
        Ok(database.clone())
    }

    async fn archive(&self, id: &DatabaseId) -> DomainResult<()> {
        let mut state = lock(&self.state);
        ensure_available(&state, "archive database")?;
        let database = state
            .databases
            .iter_mut()
            .find(|database| database.id() == id)
            .ok_or_else(|| not_found("archive database", id))?;
        if !database.archived() {
            database.archive()?;
        }
        Ok(())
    }
}
