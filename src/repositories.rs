use crate::models::{Book, NewBook, SaveBookError, StoreError};
use async_trait::async_trait;

/// Persistence behind the catalog. Reads that stand alone go through the
/// store directly; lookup-then-mutate sequences go through a unit of work so
/// they commit or roll back together.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    type Uow: BookStoreUow;

    async fn begin(&self) -> Result<Self::Uow, StoreError>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Returns the 0-indexed page in surrogate-id order; the catalog imposes
    /// its own ordering afterwards.
    async fn find_page(&self, page_no: u32, page_size: u32) -> Result<Vec<Book>, StoreError>;
}

/// A transaction scope over the store. Dropping it without `commit` rolls
/// back everything performed inside it.
#[async_trait]
pub trait BookStoreUow: Send {
    async fn find_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Inserts a new row and returns it with its assigned surrogate id.
    /// Violating the isbn unique constraint is reported as `Duplicate`.
    async fn save(&mut self, book: NewBook) -> Result<Book, SaveBookError>;

    /// Writes the entity's current field values over its existing row.
    async fn save_and_flush(&mut self, book: &Book) -> Result<(), StoreError>;

    async fn delete(&mut self, book: &Book) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}
