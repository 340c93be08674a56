use book_catalog::catalog::BookCatalog;
use book_catalog::database::{MIGRATOR, SqliteBookStore};
use book_catalog::models::{
    AddBookError, BookRequest, BookResponse, DeleteBookError, FindBookError, NewBook,
    SaveBookError,
};
use book_catalog::repositories::{BookStore, BookStoreUow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

// A shared in-memory database needs a single pooled connection, otherwise
// every checkout would see a fresh empty database.
async fn store() -> SqliteBookStore {
    let opts = SqliteConnectOptions::new().in_memory(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    SqliteBookStore::new(pool)
}

fn request(isbn: &str, author: &str) -> BookRequest {
    BookRequest::new(
        isbn.into(),
        author.into(),
        "Title".into(),
        350,
        2010,
        45.50,
        None,
    )
}

fn draft(isbn: &str, author: &str) -> NewBook {
    NewBook::try_from(&request(isbn, author)).unwrap()
}

#[tokio::test]
async fn save_assigns_an_id_and_the_row_round_trips() {
    let store = store().await;

    let mut uow = store.begin().await.unwrap();
    let saved = uow.save(draft("456123789", "Author")).await.unwrap();
    uow.commit().await.unwrap();

    assert_eq!(saved.id(), 1);
    let found = store.find_by_isbn("456123789").await.unwrap().unwrap();
    assert_eq!(found.id(), saved.id());
    assert_eq!(found.author(), "Author");
    assert_eq!(found.title(), "Title");
    assert_eq!(found.pages(), 350);
    assert_eq!(found.year(), 2010);
    assert_eq!(found.price(), 45.50);
    assert_eq!(found.cover(), None);
}

#[tokio::test]
async fn cover_blob_is_stored_and_read_back() {
    let store = store().await;
    let encoded = BASE64.encode(b"cover bytes");
    let req = BookRequest::new(
        "456123789".into(),
        "Author".into(),
        "Title".into(),
        350,
        2010,
        45.50,
        Some(encoded),
    );

    let mut uow = store.begin().await.unwrap();
    uow.save(NewBook::try_from(&req).unwrap()).await.unwrap();
    uow.commit().await.unwrap();

    let found = store.find_by_isbn("456123789").await.unwrap().unwrap();
    assert_eq!(found.cover(), Some(b"cover bytes".as_slice()));
}

#[tokio::test]
async fn inserting_a_duplicate_isbn_reports_the_unique_violation() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    uow.save(draft("456123789", "Author")).await.unwrap();
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let err = uow.save(draft("456123789", "Author2")).await.unwrap_err();

    assert!(matches!(err, SaveBookError::Duplicate { isbn } if isbn == "456123789"));
}

#[tokio::test]
async fn dropping_a_unit_of_work_rolls_back() {
    let store = store().await;

    {
        let mut uow = store.begin().await.unwrap();
        uow.save(draft("456123789", "Author")).await.unwrap();
        // no commit
    }

    assert!(store.find_by_isbn("456123789").await.unwrap().is_none());
}

#[tokio::test]
async fn find_page_limits_offsets_and_runs_out() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    for n in 0..3 {
        uow.save(draft(&format!("isbn-{n}"), &format!("Author{n}")))
            .await
            .unwrap();
    }
    uow.commit().await.unwrap();

    let first = store.find_page(0, 2).await.unwrap();
    let second = store.find_page(1, 2).await.unwrap();
    let past = store.find_page(5, 2).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].isbn(), "isbn-0");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].isbn(), "isbn-2");
    assert!(past.is_empty());
}

#[tokio::test]
async fn find_page_with_extreme_paging_values_is_empty() {
    let store = store().await;
    let mut uow = store.begin().await.unwrap();
    uow.save(draft("456123789", "Author")).await.unwrap();
    uow.commit().await.unwrap();

    let page = store.find_page(u32::MAX, u32::MAX).await.unwrap();

    assert!(page.is_empty());
}

#[tokio::test]
async fn catalog_round_trip_over_sqlite() {
    let catalog = BookCatalog::new(store().await);

    catalog
        .add_book(request("456123789", "Author"))
        .await
        .unwrap();
    let found = catalog.find_book_by_isbn("456123789").await.unwrap();

    assert_eq!(found.id(), 1);
    assert_eq!(found.isbn(), "456123789");
    assert_eq!(found.author(), "Author");
    assert_eq!(found.title(), "Title");
    assert_eq!(found.pages(), 350);
    assert_eq!(found.year(), 2010);
    assert_eq!(found.price(), 45.50);
}

#[tokio::test]
async fn catalog_add_conflicts_on_duplicate_isbn() {
    let catalog = BookCatalog::new(store().await);
    catalog
        .add_book(request("456123789", "Author"))
        .await
        .unwrap();

    let err = catalog
        .add_book(request("456123789", "Author2"))
        .await
        .unwrap_err();

    assert!(matches!(err, AddBookError::Duplicate { .. }));
    let page = catalog.find_all(0, 10).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn catalog_sorts_the_page_by_author() {
    let catalog = BookCatalog::new(store().await);
    catalog
        .add_book(request("456123789", "Author2"))
        .await
        .unwrap();
    catalog
        .add_book(request("123456789", "Author"))
        .await
        .unwrap();

    let page = catalog.find_all(0, 2).await.unwrap();

    let authors: Vec<&str> = page.iter().map(BookResponse::author).collect();
    assert_eq!(authors, ["Author", "Author2"]);
}

#[tokio::test]
async fn catalog_delete_removes_the_row_and_returns_its_last_state() {
    let catalog = BookCatalog::new(store().await);
    catalog
        .add_book(request("456123789", "Author"))
        .await
        .unwrap();

    let deleted = catalog.delete_book("456123789").await.unwrap();

    assert_eq!(deleted.isbn(), "456123789");
    let err = catalog.find_book_by_isbn("456123789").await.unwrap_err();
    assert!(matches!(err, FindBookError::NotFound { .. }));
    let err = catalog.delete_book("456123789").await.unwrap_err();
    assert!(matches!(err, DeleteBookError::NotFound { .. }));
}

#[tokio::test]
async fn catalog_update_persists_the_request_fields() {
    let catalog = BookCatalog::new(store().await);
    catalog
        .add_book(request("456123789", "Author"))
        .await
        .unwrap();
    let encoded = BASE64.encode(b"new cover");
    let req = BookRequest::new(
        "456123789".into(),
        "Author Revised".into(),
        "Title Revised".into(),
        500,
        2012,
        55.55,
        Some(encoded.clone()),
    );

    let updated = catalog.update_book(req).await.unwrap();

    assert_eq!(updated.id(), 1);
    assert_eq!(updated.cover(), Some(encoded.as_str()));
    let found = catalog.find_book_by_isbn("456123789").await.unwrap();
    assert_eq!(found.author(), "Author Revised");
    assert_eq!(found.pages(), 500);
    assert_eq!(found.price(), 55.55);
    assert_eq!(found.cover(), Some(encoded.as_str()));
}
