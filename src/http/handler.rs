use crate::http::AppState;
use crate::models::{
    AddBookError, BookRequest, BookResponse, DeleteBookError, FindBookError, ListBooksError,
    UpdateBookError,
};
use crate::repositories::BookStore;
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

const KIND_UNKNOWN_BOOK: &str = "unknown.book";
const KIND_DUPLICATE_ISBN: &str = "duplicate.isbn";
const KIND_INVALID_COVER: &str = "invalid.cover";
const KIND_INTERNAL: &str = "internal.error";

// Call-site codes carried in error bodies so clients can tell which
// operation missed: 1 read, 2 delete, 4 update; 3 is the insert conflict.
const CODE_FIND_MISS: u16 = 1;
const CODE_DELETE_MISS: u16 = 2;
const CODE_INSERT_CONFLICT: u16 = 3;
const CODE_UPDATE_MISS: u16 = 4;
const CODE_NONE: u16 = 0;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    code: u16,
    kind: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    fn not_found(code: u16, message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ApiErrorBody {
                code,
                kind: KIND_UNKNOWN_BOOK,
                message,
            },
        }
    }

    fn conflict(code: u16, message: String) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            body: ApiErrorBody {
                code,
                kind: KIND_DUPLICATE_ISBN,
                message,
            },
        }
    }

    fn unprocessable(message: String) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ApiErrorBody {
                code: CODE_NONE,
                kind: KIND_INVALID_COVER,
                message,
            },
        }
    }

    fn internal(cause: &anyhow::Error) -> Self {
        tracing::error!("{cause:#}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody {
                code: CODE_NONE,
                kind: KIND_INTERNAL,
                message: "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<FindBookError> for ApiError {
    fn from(err: FindBookError) -> Self {
        match err {
            FindBookError::NotFound { .. } => Self::not_found(CODE_FIND_MISS, err.to_string()),
            FindBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<DeleteBookError> for ApiError {
    fn from(err: DeleteBookError) -> Self {
        match err {
            DeleteBookError::NotFound { .. } => Self::not_found(CODE_DELETE_MISS, err.to_string()),
            DeleteBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<ListBooksError> for ApiError {
    fn from(err: ListBooksError) -> Self {
        Self::internal(&err.0)
    }
}

impl From<AddBookError> for ApiError {
    fn from(err: AddBookError) -> Self {
        match err {
            AddBookError::Duplicate { .. } => Self::conflict(CODE_INSERT_CONFLICT, err.to_string()),
            AddBookError::InvalidCover(_) => Self::unprocessable(err.to_string()),
            AddBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<UpdateBookError> for ApiError {
    fn from(err: UpdateBookError) -> Self {
        match err {
            UpdateBookError::NotFound { .. } => Self::not_found(CODE_UPDATE_MISS, err.to_string()),
            UpdateBookError::InvalidCover(_) => Self::unprocessable(err.to_string()),
            UpdateBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "pageNo")]
    page_no: u32,
    #[serde(rename = "pageSize")]
    page_size: u32,
}

pub async fn find_book<S: BookStore>(
    State(state): State<AppState<S>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.catalog().find_book_by_isbn(&isbn).await?;
    Ok(Json(book))
}

pub async fn delete_book<S: BookStore>(
    State(state): State<AppState<S>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.catalog().delete_book(&isbn).await?;
    Ok(Json(book))
}

pub async fn list_books<S: BookStore>(
    State(state): State<AppState<S>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = state.catalog().find_all(page.page_no, page.page_size).await?;
    Ok(Json(books))
}

pub async fn add_book<S: BookStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.catalog().add_book(body).await?;
    Ok(Json(book))
}

// The body's isbn governs the lookup; the path segment only routes.
pub async fn update_book<S: BookStore>(
    State(state): State<AppState<S>>,
    Path(isbn): Path<String>,
    Json(body): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    tracing::debug!(%isbn, "updating book");
    let book = state.catalog().update_book(body).await?;
    Ok(Json(book))
}
