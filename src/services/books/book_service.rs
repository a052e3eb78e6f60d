//! # Book service
//!
//! Catalog reads, recommendations and owner-checked writes.
//!
//! ## Rules
//!
//! - Empty listings are a 404, matching the public API.
//! - Viewing a book by id always counts a view; viewing it by `pathUrl`
//!   counts one unless the caller owns the book.
//! - Only the owner (`userId`) may update or delete a book.

use std::sync::Arc;

use log::info;
use mongodb::bson::doc;
use singleton_macro::service;

use crate::{
    domain::dto::books::{
        BookDetailResponse, BookFilterQuery, BookListResponse, BookOptions, BookResponse, BookTeaser,
        CreateBookRequest, FilteredBookInfo, FilteredBookResponse, MostViewedBooks, MostViewedQuery,
        UpdateBookRequest, ViewDetail,
    },
    domain::entities::books::Book,
    domain::models::auth::AuthenticatedUser,
    domain::models::pagination::{PageLinks, Pagination, PaginationInfo},
    errors::AppError,
    repositories::books::{book_queries, BookFilter, BookRepository},
    repositories::favorites::FavoriteRepository,
    utils::mongo_utils::parse_object_id,
};

#[service(name = "book")]
pub struct BookService {
    book_repo: Arc<BookRepository>,
    favorite_repo: Arc<FavoriteRepository>,
}

fn book_not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

impl BookService {
    pub async fn list(&self, pagination: Pagination, links: &PageLinks) -> Result<BookListResponse, AppError> {
        let page = self.book_repo.find_page(pagination).await?;

        if page.results.is_empty() {
            return Err(AppError::NotFound("No books found".to_string()));
        }

        Ok(BookListResponse {
            info: PaginationInfo::new(page.total, pagination, links),
            results: page.results,
        })
    }

    pub async fn filter(
        &self,
        query: &BookFilterQuery,
        pagination: Pagination,
        links: &PageLinks,
    ) -> Result<FilteredBookResponse, AppError> {
        let filter = BookFilter::from_query(query)?;
        let page = self.book_repo.find_filtered(&filter, pagination).await?;

        if page.results.is_empty() {
            return Err(AppError::NotFound("No books match the given filters".to_string()));
        }

        let total = u64::try_from(page.total_books).unwrap_or_default();

        Ok(FilteredBookResponse {
            info: FilteredBookInfo {
                pagination: PaginationInfo::new(total, pagination, links),
                year_counts: page.year_counts,
                language_counts: page.language_counts,
            },
            results: page.results,
        })
    }

    pub async fn search(&self, term: Option<&str>) -> Result<Vec<BookTeaser>, AppError> {
        let term = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .ok_or_else(|| AppError::ValidationError("The q query parameter is required".to_string()))?;

        let results = self.book_repo.search(term).await?;

        if results.is_empty() {
            return Err(AppError::NotFound(format!("No results found for: {}", term)));
        }

        Ok(results)
    }

    pub async fn options(&self) -> Result<BookOptions, AppError> {
        self.book_repo.find_options().await
    }

    pub async fn random(&self) -> Result<Vec<BookTeaser>, AppError> {
        self.book_repo.sample(doc! {}).await
    }

    /// Random books sharing the first category of `id`.
    pub async fn related(&self, id: &str) -> Result<Vec<BookTeaser>, AppError> {
        let book = self.find_existing(id).await?;
        let (Some(book_id), Some(category)) = (book.id, book.first_category()) else {
            return Ok(Vec::new());
        };

        self.book_repo.sample(book_queries::related_filter(book_id, category)).await
    }

    /// Random books sharing the first author of `id`.
    pub async fn more_by_author(&self, id: &str) -> Result<Vec<BookTeaser>, AppError> {
        let book = self.find_existing(id).await?;
        let (Some(book_id), Some(author)) = (book.id, book.first_author()) else {
            return Ok(Vec::new());
        };

        self.book_repo.sample(book_queries::same_author_filter(book_id, author)).await
    }

    pub async fn most_viewed(&self, query: &MostViewedQuery) -> Result<MostViewedBooks, AppError> {
        match query.detail()? {
            ViewDetail::Summary => Ok(MostViewedBooks::Summary(self.book_repo.most_viewed_summary().await?)),
            ViewDetail::Full => Ok(MostViewedBooks::Full(self.book_repo.most_viewed_full().await?)),
        }
    }

    /// Full book by id; counts a view.
    pub async fn get_by_id(&self, id: &str) -> Result<BookResponse, AppError> {
        let book_id = parse_object_id(id, "book id")?;

        self.book_repo
            .record_view(book_id)
            .await?
            .map(BookResponse::from)
            .ok_or_else(book_not_found)
    }

    /// Full book by slug with the viewer's favorite flag.
    pub async fn get_by_path_url(
        &self,
        path_url: &str,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<BookDetailResponse, AppError> {
        let book = self
            .book_repo
            .find_by_path_url(path_url.trim())
            .await?
            .ok_or_else(book_not_found)?;

        let is_owner = viewer.is_some_and(|viewer| book.is_owned_by(&viewer.uid));

        let book = match (is_owner, book.id) {
            (false, Some(book_id)) => self.book_repo.record_view(book_id).await?.unwrap_or(book),
            _ => book,
        };

        let is_favorite = match (viewer, book.id) {
            (Some(viewer), Some(book_id)) => self.favorite_repo.is_favorite(&viewer.uid, book_id).await?,
            _ => false,
        };

        Ok(BookDetailResponse {
            book: BookResponse::from(book),
            is_favorite,
        })
    }

    pub async fn create(&self, caller: &AuthenticatedUser, request: CreateBookRequest) -> Result<BookResponse, AppError> {
        caller.ensure_owner(&request.user_id)?;

        let book = self.book_repo.create(request.into_entity()?).await?;
        info!("Book created: {} by {}", book.path_url, caller.uid);

        Ok(BookResponse::from(book))
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: &str,
        request: &UpdateBookRequest,
    ) -> Result<BookResponse, AppError> {
        let update = request
            .to_set_document()?
            .ok_or_else(|| AppError::ValidationError("No fields to update".to_string()))?;

        let book = self.find_owned(caller, id).await?;
        let book_id = book.id.ok_or_else(book_not_found)?;

        self.book_repo
            .update(book_id, update)
            .await?
            .map(BookResponse::from)
            .ok_or_else(book_not_found)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: &str) -> Result<(), AppError> {
        let book = self.find_owned(caller, id).await?;
        let book_id = book.id.ok_or_else(book_not_found)?;

        if !self.book_repo.delete(book_id).await? {
            return Err(book_not_found());
        }

        info!("Book deleted: {} by {}", book.path_url, caller.uid);
        Ok(())
    }

    async fn find_existing(&self, id: &str) -> Result<Book, AppError> {
        let book_id = parse_object_id(id, "book id")?;
        self.book_repo.find_by_id(book_id).await?.ok_or_else(book_not_found)
    }

    async fn find_owned(&self, caller: &AuthenticatedUser, id: &str) -> Result<Book, AppError> {
        let book = self.find_existing(id).await?;

        if !book.is_owned_by(&caller.uid) {
            return Err(AppError::AuthorizationError(
                "Only the owner can modify this book".to_string(),
            ));
        }

        Ok(book)
    }
}
