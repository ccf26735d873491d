//! # Book Repository
//!
//! Books and their lendable copies.
//!
//! A book row is registered together with a batch of copies in one
//! transaction; availability is derived by counting copies against
//! active loans, never stored.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{DbError, DbResult};
use ateneo_core::types::{Book, Copy};

/// Inbound payload for book registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBookRequest {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Number of copies to create; defaults to 1.
    pub copies: Option<i32>,
}

/// A book hydrated with its copies.
#[derive(Debug, Clone, Serialize)]
pub struct BookWithCopies {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: Vec<Copy>,
}

/// Copy counts for one book.
#[derive(Debug, Clone, Serialize)]
pub struct BookAvailability {
    pub total: i64,
    pub on_loan: i64,
    pub available: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct AvailabilityRow {
    total: i64,
    on_loan: i64,
}

fn with_copies(book: Book, copies: Vec<Copy>) -> BookWithCopies {
    BookWithCopies {
        id: book.id,
        title: book.title,
        author: book.author,
        isbn: book.isbn,
        copies,
    }
}

/// Repository for book and copy operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: PgPool) -> Self {
        BookRepository { pool }
    }

    /// Registers a book and its copies in one transaction.
    pub async fn register_with_copies(&self, req: &NewBookRequest) -> DbResult<BookWithCopies> {
        let (isbn, title, author) = match (
            req.isbn.as_deref().map(str::trim),
            req.title.as_deref().map(str::trim),
            req.author.as_deref().map(str::trim),
        ) {
            (Some(i), Some(t), Some(a)) if !i.is_empty() && !t.is_empty() && !a.is_empty() => {
                (i, t, a)
            }
            _ => return Err(DbError::bad_request("isbn, title and author are required")),
        };

        let copies = req.copies.unwrap_or(1);
        if copies < 1 {
            return Err(DbError::bad_request("copies must be at least 1"));
        }

        let duplicate =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM book WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        if duplicate {
            // Same message the unique-constraint translation produces, so a
            // racing duplicate reads identically.
            return Err(DbError::conflict("A book with that ISBN already exists"));
        }

        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO book (title, author, isbn)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .fetch_one(&mut *tx)
        .await?;

        let created: Vec<Copy> = sqlx::query_as::<_, Copy>(
            r#"
            INSERT INTO copy (book_id)
            SELECT $1 FROM generate_series(1, $2)
            RETURNING id, book_id
            "#,
        )
        .bind(book.id)
        .bind(copies)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(book_id = book.id, copies = created.len(), "Book registered");
        Ok(with_copies(book, created))
    }

    /// Searches books by title substring (case-insensitive) or exact ISBN.
    pub async fn search(&self, search: &str) -> DbResult<Vec<BookWithCopies>> {
        let pattern = format!("%{}%", search.trim());

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, isbn
            FROM book
            WHERE title ILIKE $1 OR isbn = $2
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .bind(search.trim())
        .fetch_all(&self.pool)
        .await?;

        if books.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let copies = sqlx::query_as::<_, Copy>(
            r#"
            SELECT id, book_id
            FROM copy
            WHERE book_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: BTreeMap<i32, Vec<Copy>> = BTreeMap::new();
        for copy in copies {
            grouped.entry(copy.book_id).or_default().push(copy);
        }

        Ok(books
            .into_iter()
            .map(|book| {
                let copies = grouped.remove(&book.id).unwrap_or_default();
                with_copies(book, copies)
            })
            .collect())
    }

    /// Counts copies for a book: total, on loan, available.
    ///
    /// A book with zero copies is indistinguishable from a missing book,
    /// and both report NotFound.
    pub async fn availability(&self, book_id: i32) -> DbResult<BookAvailability> {
        let row = sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(l.id) AS on_loan
            FROM copy c
            LEFT JOIN loan l ON l.copy_id = c.id AND l.returned_at IS NULL
            WHERE c.book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        if row.total == 0 {
            return Err(DbError::not_found("Book has no copies or does not exist"));
        }

        Ok(BookAvailability {
            total: row.total,
            on_loan: row.on_loan,
            available: row.total - row.on_loan,
        })
    }

    /// Fetches one copy by id.
    pub async fn get_copy(&self, copy_id: i32) -> DbResult<Copy> {
        let copy = sqlx::query_as::<_, Copy>(
            r#"
            SELECT id, book_id
            FROM copy
            WHERE id = $1
            "#,
        )
        .bind(copy_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Copy not found"))?;

        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_subtracts_loans_from_total() {
        let availability = BookAvailability {
            total: 5,
            on_loan: 2,
            available: 3,
        };
        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["on_loan"], 2);
        assert_eq!(json["available"], 3);
    }

    #[test]
    fn hydrated_book_keeps_copy_order() {
        let book = Book {
            id: 1,
            title: "Ficciones".to_string(),
            author: "Jorge Luis Borges".to_string(),
            isbn: "978-0-8021-3030-3".to_string(),
        };
        let copies = vec![Copy { id: 1, book_id: 1 }, Copy { id: 2, book_id: 1 }];
        let view = with_copies(book, copies);
        assert_eq!(view.copies.len(), 2);
        assert!(view.copies[0].id < view.copies[1].id);
    }
}
