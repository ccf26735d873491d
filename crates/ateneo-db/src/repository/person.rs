//! # Person Repository
//!
//! Member and librarian registration and lookups.
//!
//! ## Roles and Codes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  role_id = 1 (Member)     → member_id code        "S-1234"             │
//! │  role_id = 2 (Librarian)  → enrollment_librarian  "B-5678"             │
//! │                                                                         │
//! │  dni is unique across both roles; codes are unique where present.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::error::{DbError, DbResult};
use ateneo_core::types::{Person, PersonRole};
use ateneo_core::validation::ensure_role;

/// Inbound payload for member/librarian registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPersonRequest {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub dni: Option<String>,
}

/// Generates a person code: `S-` or `B-` plus four random digits.
fn generate_person_code(role: PersonRole) -> String {
    let number = rand::thread_rng().gen_range(1000..10000);
    format!("{}-{}", role.code_prefix(), number)
}

/// Repository for person operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    /// Creates a new PersonRepository.
    pub fn new(pool: PgPool) -> Self {
        PersonRepository { pool }
    }

    /// Registers a member with a generated `S-xxxx` code.
    pub async fn register_member(&self, req: &NewPersonRequest) -> DbResult<Person> {
        self.register(req, PersonRole::Member).await
    }

    /// Registers a librarian with a generated `B-xxxx` code.
    pub async fn register_librarian(&self, req: &NewPersonRequest) -> DbResult<Person> {
        self.register(req, PersonRole::Librarian).await
    }

    async fn register(&self, req: &NewPersonRequest, role: PersonRole) -> DbResult<Person> {
        let (name, lastname, dni) = match (
            req.name.as_deref().map(str::trim),
            req.lastname.as_deref().map(str::trim),
            req.dni.as_deref().map(str::trim),
        ) {
            (Some(n), Some(l), Some(d)) if !n.is_empty() && !l.is_empty() && !d.is_empty() => {
                (n, l, d)
            }
            _ => return Err(DbError::bad_request("name, lastname and dni are required")),
        };

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM person WHERE dni = $1)",
        )
        .bind(dni)
        .fetch_one(&self.pool)
        .await?;

        if duplicate {
            // Same message the unique-constraint translation produces, so a
            // racing duplicate reads identically.
            return Err(DbError::conflict(
                "A person with the provided dni already exists",
            ));
        }

        let code = generate_person_code(role);
        let (member_code, librarian_code) = match role {
            PersonRole::Member => (Some(code), None),
            PersonRole::Librarian => (None, Some(code)),
        };

        // A concurrent duplicate dni slips past the check above; the unique
        // constraint reports it and the translation turns it into a Conflict.
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO person (name, lastname, dni, role_id, member_id, enrollment_librarian)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, lastname, dni, role_id, member_id, enrollment_librarian
            "#,
        )
        .bind(name)
        .bind(lastname)
        .bind(dni)
        .bind(role.id())
        .bind(member_code)
        .bind(librarian_code)
        .fetch_one(&self.pool)
        .await?;

        info!(person_id = person.id, role = role.label(), "Person registered");
        Ok(person)
    }

    /// Lists members in id order.
    pub async fn list_members(&self) -> DbResult<Vec<Person>> {
        self.list_by_role(PersonRole::Member).await
    }

    /// Lists librarians in id order.
    pub async fn list_librarians(&self) -> DbResult<Vec<Person>> {
        self.list_by_role(PersonRole::Librarian).await
    }

    async fn list_by_role(&self, role: PersonRole) -> DbResult<Vec<Person>> {
        let people = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, name, lastname, dni, role_id, member_id, enrollment_librarian
            FROM person
            WHERE role_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(role.id())
        .fetch_all(&self.pool)
        .await?;

        Ok(people)
    }

    /// Fetches a person who must exist and hold the Member role.
    ///
    /// Absent person → NotFound; wrong role → BadRequest.
    pub async fn get_member(&self, id: i32) -> DbResult<Person> {
        self.get_with_role(id, PersonRole::Member).await
    }

    /// Fetches a person who must exist and hold the Librarian role.
    pub async fn get_librarian(&self, id: i32) -> DbResult<Person> {
        self.get_with_role(id, PersonRole::Librarian).await
    }

    async fn get_with_role(&self, id: i32, role: PersonRole) -> DbResult<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, name, lastname, dni, role_id, member_id, enrollment_librarian
            FROM person
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            DbError::not_found(match role {
                PersonRole::Member => "Member not found",
                PersonRole::Librarian => "Librarian not found",
            })
        })?;

        ensure_role(&person, role)?;
        Ok(person)
    }
}
