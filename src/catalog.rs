use crate::models::{
    AddBookError, BookRequest, BookResponse, DeleteBookError, FindBookError, ListBooksError,
    NewBook, SaveBookError, UpdateBookError,
};
use crate::repositories::{BookStore, BookStoreUow};

/// The catalog's operation contract over a [`BookStore`]. Holds no state of
/// its own between calls; the store owns the authoritative copy.
#[derive(Debug, Clone)]
pub struct BookCatalog<S: BookStore> {
    store: S,
}

impl<S: BookStore> BookCatalog<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_book_by_isbn(&self, isbn: &str) -> Result<BookResponse, FindBookError> {
        let book = self
            .store
            .find_by_isbn(isbn)
            .await
            .map_err(|err| FindBookError::Other(err.0))?
            .ok_or_else(|| FindBookError::NotFound { isbn: isbn.into() })?;

        Ok(BookResponse::from(&book))
    }

    /// Removes the book and returns its last known state. Lookup and delete
    /// commit together; a failure on either path leaves the row in place.
    pub async fn delete_book(&self, isbn: &str) -> Result<BookResponse, DeleteBookError> {
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|err| DeleteBookError::Other(err.0))?;
        let book = uow
            .find_by_isbn(isbn)
            .await
            .map_err(|err| DeleteBookError::Other(err.0))?
            .ok_or_else(|| DeleteBookError::NotFound { isbn: isbn.into() })?;
        uow.delete(&book)
            .await
            .map_err(|err| DeleteBookError::Other(err.0))?;
        uow.commit()
            .await
            .map_err(|err| DeleteBookError::Other(err.0))?;

        Ok(BookResponse::from(&book))
    }

    /// Returns the requested page sorted ascending by author, ties keeping
    /// store order. Paging past the last record yields an empty list.
    pub async fn find_all(
        &self,
        page_no: u32,
        page_size: u32,
    ) -> Result<Vec<BookResponse>, ListBooksError> {
        let books = self
            .store
            .find_page(page_no, page_size)
            .await
            .map_err(|err| ListBooksError(err.0))?;

        let mut responses: Vec<BookResponse> = books.iter().map(BookResponse::from).collect();
        responses.sort_by(|a, b| a.author().cmp(b.author()));

        Ok(responses)
    }

    pub async fn add_book(&self, req: BookRequest) -> Result<BookResponse, AddBookError> {
        let draft = NewBook::try_from(&req)?;
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|err| AddBookError::Other(err.0))?;
        let book = uow.save(draft).await.map_err(|err| match err {
            SaveBookError::Duplicate { isbn } => AddBookError::Duplicate { isbn },
            SaveBookError::Other(cause) => AddBookError::Other(cause),
        })?;
        uow.commit()
            .await
            .map_err(|err| AddBookError::Other(err.0))?;

        Ok(BookResponse::from(&book))
    }

    /// Overwrites the stored book carrying the request's isbn with the
    /// request's fields and persists immediately.
    ///
    /// The system this replaces silently dropped the request's price and
    /// pages here, updating only the cover. That was judged a defect and is
    /// fixed: every field comes from the request.
    pub async fn update_book(&self, req: BookRequest) -> Result<BookResponse, UpdateBookError> {
        let draft = NewBook::try_from(&req)?;
        let mut uow = self
            .store
            .begin()
            .await
            .map_err(|err| UpdateBookError::Other(err.0))?;
        let existing = uow
            .find_by_isbn(req.isbn())
            .await
            .map_err(|err| UpdateBookError::Other(err.0))?
            .ok_or_else(|| UpdateBookError::NotFound {
                isbn: req.isbn().into(),
            })?;
        let updated = draft.into_book(existing.id());
        uow.save_and_flush(&updated)
            .await
            .map_err(|err| UpdateBookError::Other(err.0))?;
        uow.commit()
            .await
            .map_err(|err| UpdateBookError::Other(err.0))?;

        Ok(BookResponse::from(&updated))
    }
}
