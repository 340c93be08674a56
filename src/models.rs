use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalog entry as the store holds it. `isbn` is the business key and is
/// unique across all stored books; `id` is the store-assigned surrogate.
#[derive(Debug, Clone)]
pub struct Book {
    id: i64,
    isbn: String,
    author: String,
    title: String,
    pages: i32,
    year: i32,
    price: f64,
    cover: Option<Vec<u8>>,
}

impl Book {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: i64,
        isbn: String,
        author: String,
        title: String,
        pages: i32,
        year: i32,
        price: f64,
        cover: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id,
            isbn,
            author,
            title,
            pages,
            year,
            price,
            cover,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn pages(&self) -> i32 {
        self.pages
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub fn cover(&self) -> Option<&[u8]> {
        self.cover.as_deref()
    }
}

/// A book in entity shape but without a surrogate id; the store assigns one
/// on insert.
#[derive(Debug, Clone)]
pub struct NewBook {
    isbn: String,
    author: String,
    title: String,
    pages: i32,
    year: i32,
    price: f64,
    cover: Option<Vec<u8>>,
}

impl NewBook {
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn pages(&self) -> i32 {
        self.pages
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub fn cover(&self) -> Option<&[u8]> {
        self.cover.as_deref()
    }

    /// Attaches a surrogate id, producing the full entity shape. Used when a
    /// request overwrites an existing row.
    pub fn into_book(self, id: i64) -> Book {
        Book::new(
            id, self.isbn, self.author, self.title, self.pages, self.year, self.price, self.cover,
        )
    }
}

/// Caller-supplied book fields. The cover travels as base64 text and is only
/// decoded when projected into entity shape.
#[derive(Debug, Clone, Deserialize)]
pub struct BookRequest {
    isbn: String,
    author: String,
    title: String,
    pages: i32,
    year: i32,
    price: f64,
    cover: Option<String>,
}

impl BookRequest {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        isbn: String,
        author: String,
        title: String,
        pages: i32,
        year: i32,
        price: f64,
        cover: Option<String>,
    ) -> Self {
        Self {
            isbn,
            author,
            title,
            pages,
            year,
            price,
            cover,
        }
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }
}

#[derive(Error, Debug)]
#[error("Cover is not valid base64")]
pub struct CoverDecodeError(#[from] base64::DecodeError);

impl TryFrom<&BookRequest> for NewBook {
    type Error = CoverDecodeError;

    fn try_from(req: &BookRequest) -> Result<Self, Self::Error> {
        let cover = req
            .cover
            .as_deref()
            .map(|text| BASE64.decode(text))
            .transpose()?;
        Ok(Self {
            isbn: req.isbn.clone(),
            author: req.author.clone(),
            title: req.title.clone(),
            pages: req.pages,
            year: req.year,
            price: req.price,
            cover,
        })
    }
}

/// The shape handed back to callers. Covers are rendered to base64 so they
/// round-trip against the request encoding.
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    id: i64,
    isbn: String,
    author: String,
    title: String,
    pages: i32,
    year: i32,
    price: f64,
    cover: Option<String>,
}

impl BookResponse {
    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn pages(&self) -> i32 {
        self.pages
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            isbn: book.isbn.clone(),
            author: book.author.clone(),
            title: book.title.clone(),
            pages: book.pages,
            year: book.year,
            price: book.price,
            cover: book.cover.as_deref().map(|bytes| BASE64.encode(bytes)),
        }
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct StoreError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum SaveBookError {
    #[error("Book with isbn \"{isbn}\" already exists")]
    Duplicate { isbn: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with isbn \"{isbn}\" does not exist")]
    NotFound { isbn: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with isbn \"{isbn}\" does not exist")]
    NotFound { isbn: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ListBooksError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum AddBookError {
    #[error("Book with isbn \"{isbn}\" already exists")]
    Duplicate { isbn: String },
    #[error(transparent)]
    InvalidCover(#[from] CoverDecodeError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book with isbn \"{isbn}\" does not exist")]
    NotFound { isbn: String },
    #[error(transparent)]
    InvalidCover(#[from] CoverDecodeError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_serializes_with_the_wire_field_names() {
        let book = Book::new(
            1,
            "456123789".into(),
            "Author".into(),
            "Title".into(),
            350,
            2010,
            45.50,
            Some(b"cover bytes".to_vec()),
        );

        let value = serde_json::to_value(BookResponse::from(&book)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "isbn": "456123789",
                "author": "Author",
                "title": "Title",
                "pages": 350,
                "year": 2010,
                "price": 45.50,
                "cover": BASE64.encode(b"cover bytes"),
            })
        );
    }

    #[test]
    fn request_deserializes_without_a_cover() {
        let value = json!({
            "isbn": "456123789",
            "author": "Author3",
            "title": "Title3",
            "pages": 500,
            "year": 2005,
            "price": 55.55,
            "cover": null,
        });

        let req: BookRequest = serde_json::from_value(value).unwrap();

        assert_eq!(req.isbn(), "456123789");
        let draft = NewBook::try_from(&req).unwrap();
        assert_eq!(draft.author(), "Author3");
        assert_eq!(draft.cover(), None);
    }

    #[test]
    fn request_with_bad_cover_text_fails_to_project() {
        let req = BookRequest::new(
            "456123789".into(),
            "Author".into(),
            "Title".into(),
            350,
            2010,
            45.50,
            Some("%%not-base64%%".into()),
        );

        assert!(NewBook::try_from(&req).is_err());
    }
}
