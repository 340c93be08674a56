use crate::models::{Book, NewBook, SaveBookError, StoreError};
use crate::repositories::{BookStore, BookStoreUow};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn establish_pool(path: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(path)
        .with_context(|| format!("Invalid database path {path}"))?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePool::connect_with(opts)
        .await
        .with_context(|| format!("Failed to open database at {path}"))?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let isbn = row.try_get("isbn")?;
        let author = row.try_get("author")?;
        let title = row.try_get("title")?;
        let pages = row.try_get("pages")?;
        let year = row.try_get("year")?;
        let price = row.try_get("price")?;
        let cover = row.try_get("cover")?;

        Ok(Self::new(id, isbn, author, title, pages, year, price, cover))
    }
}

const SELECT_BY_ISBN: &str =
    "SELECT id, isbn, author, title, pages, year, price, cover FROM book WHERE isbn = ?";

async fn fetch_by_isbn<'e, E>(executor: E, isbn: &str) -> Result<Option<Book>, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let book = sqlx::query_as(SELECT_BY_ISBN)
        .bind(isbn)
        .fetch_optional(executor)
        .await
        .map_err(|err| {
            let err =
                anyhow!(err).context(format!(r#"Failed to retrieve book with isbn "{isbn}""#));
            StoreError(err)
        })?;

    Ok(book)
}

#[async_trait]
impl BookStore for SqliteBookStore {
    type Uow = SqliteBookStoreUow;

    async fn begin(&self) -> Result<Self::Uow, StoreError> {
        let tx = self.pool.begin().await.map_err(|err| {
            let err = anyhow!(err).context("Failed to begin a transaction");
            StoreError(err)
        })?;

        Ok(SqliteBookStoreUow { tx })
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        fetch_by_isbn(&self.pool, isbn).await
    }

    async fn find_page(&self, page_no: u32, page_size: u32) -> Result<Vec<Book>, StoreError> {
        let limit = i64::from(page_size);
        // Saturate rather than wrap: a negative OFFSET would hand back the
        // first page instead of an empty one.
        let offset = i64::from(page_no).saturating_mul(i64::from(page_size));
        let books = sqlx::query_as(
            "SELECT id, isbn, author, title, pages, year, price, cover FROM book \
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!("Failed to retrieve page {page_no}"));
            StoreError(err)
        })?;

        Ok(books)
    }
}

pub struct SqliteBookStoreUow {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl BookStoreUow for SqliteBookStoreUow {
    async fn find_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>, StoreError> {
        fetch_by_isbn(&mut *self.tx, isbn).await
    }

    async fn save(&mut self, book: NewBook) -> Result<Book, SaveBookError> {
        let stored = sqlx::query_as(
            "INSERT INTO book (isbn, author, title, pages, year, price, cover) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(book.isbn())
        .bind(book.author())
        .bind(book.title())
        .bind(book.pages())
        .bind(book.year())
        .bind(book.price())
        .bind(book.cover())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                SaveBookError::Duplicate {
                    isbn: book.isbn().to_string(),
                }
            } else {
                let err = anyhow!(err).context(format!(
                    r#"Failed to insert book with isbn "{}""#,
                    book.isbn()
                ));
                SaveBookError::Other(err)
            }
        })?;

        Ok(stored)
    }

    async fn save_and_flush(&mut self, book: &Book) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE book SET isbn = ?, author = ?, title = ?, pages = ?, year = ?, \
             price = ?, cover = ? WHERE id = ?",
        )
        .bind(book.isbn())
        .bind(book.author())
        .bind(book.title())
        .bind(book.pages())
        .bind(book.year())
        .bind(book.price())
        .bind(book.cover())
        .bind(book.id())
        .execute(&mut *self.tx)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!(
                r#"Failed to update book with isbn "{}""#,
                book.isbn()
            ));
            StoreError(err)
        })?;

        Ok(())
    }

    async fn delete(&mut self, book: &Book) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(book.id())
            .execute(&mut *self.tx)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to delete book with isbn "{}""#,
                    book.isbn()
                ));
                StoreError(err)
            })?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(|err| {
            let err = anyhow!(err).context("Failed to commit a transaction");
            StoreError(err)
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_unique_violation();
    }

    false
}
