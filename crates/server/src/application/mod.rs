// Use cases: one per exposed tool.

pub mod databases;
pub mod pages;

pub use databases::{
    GetDatabase, GetDatabaseStatistics, ListDatabases, UpdateDatabase, UpdateDatabaseInput,
};
pub use pages::{
    ArchiveAllPages, ArchivedPages, CreatePage, CreatePageInput, DatabaseIdInput, DeletePage,
    DuplicatePage, GetPage, PageIdInput, QueryPages, QueryPagesInput, UpdatePage, UpdatePageInput,
};
