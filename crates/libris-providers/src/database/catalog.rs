//! PostgreSQL member, book and circulation repositories

use super::sequence::{CodeSequence, insert_with_code};
use super::{DatabasePool, calendar_day, map_pg_error, timestamp};
use async_trait::async_trait;
use libris_domain::constants::{BOOK_CODE_PREFIX, CIRCULATION_CODE_PREFIX, MEMBER_CODE_PREFIX};
use libris_domain::entities::{
    Book, BookPatch, Circulation, CirculationPatch, CirculationReturn, Member, MemberPatch,
    NewBook, NewCirculation, NewMember,
};
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{BookRepository, CirculationRepository, MemberRepository};
use libris_domain::value_objects::{Page, PageRequest};
use r2d2_postgres::postgres::{GenericClient, Row};
use uuid::Uuid;

const MEMBERS: CodeSequence = CodeSequence {
    table: "members",
    prefix: MEMBER_CODE_PREFIX,
};

const BOOKS: CodeSequence = CodeSequence {
    table: "books",
    prefix: BOOK_CODE_PREFIX,
};

const CIRCULATIONS: CodeSequence = CodeSequence {
    table: "circulations",
    prefix: CIRCULATION_CODE_PREFIX,
};

const MEMBER_SELECT: &str = "
    SELECT id, code, name, gender, class, phone, photo,
           EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM updated_at)::BIGINT AS updated_at
    FROM members";

const BOOK_SELECT: &str = "
    SELECT id, code, title, cover, document, author, publisher, year,
           EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM updated_at)::BIGINT AS updated_at
    FROM books";

const CIRCULATION_SELECT: &str = "
    SELECT id, code, member_id, book_id,
           borrowed_on::TEXT AS borrowed_on,
           due_on::TEXT AS due_on,
           returned_on::TEXT AS returned_on,
           fine,
           EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM updated_at)::BIGINT AS updated_at
    FROM circulations";

fn member_from_row(row: &Row) -> Result<Member> {
    let gender: String = row.get("gender");
    Ok(Member {
        id: row.get("id"),
        code: row.get("code"),
        name: row.get("name"),
        gender: gender.parse()?,
        class: row.get("class"),
        phone: row.get("phone"),
        photo: row.get("photo"),
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    })
}

fn book_from_row(row: &Row) -> Book {
    Book {
        id: row.get("id"),
        code: row.get("code"),
        title: row.get("title"),
        cover: row.get("cover"),
        document: row.get("document"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        year: row.get("year"),
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    }
}

fn circulation_from_row(row: &Row) -> Result<Circulation> {
    let returned_on: Option<String> = row.get("returned_on");
    Ok(Circulation {
        id: row.get("id"),
        code: row.get("code"),
        member_id: row.get("member_id"),
        book_id: row.get("book_id"),
        borrowed_on: calendar_day(row.get("borrowed_on"))?,
        due_on: calendar_day(row.get("due_on"))?,
        returned_on: returned_on.as_deref().map(calendar_day).transpose()?,
        fine: row.get("fine"),
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    })
}

fn find_member<C: GenericClient>(
    client: &mut C,
    column: &str,
    value: &str,
) -> Result<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE {column} = $1");
    client
        .query_opt(sql.as_str(), &[&value])
        .map_err(|e| map_pg_error("Failed to load member", e))?
        .as_ref()
        .map(member_from_row)
        .transpose()
}

fn find_book<C: GenericClient>(client: &mut C, column: &str, value: &str) -> Result<Option<Book>> {
    let sql = format!("{BOOK_SELECT} WHERE {column} = $1");
    client
        .query_opt(sql.as_str(), &[&value])
        .map(|row| row.as_ref().map(book_from_row))
        .map_err(|e| map_pg_error("Failed to load book", e))
}

/// First loan matching `condition`, which binds its value as `$1`
fn find_circulation<C: GenericClient>(
    client: &mut C,
    condition: &str,
    value: &str,
) -> Result<Option<Circulation>> {
    let sql = format!("{CIRCULATION_SELECT} WHERE {condition} LIMIT 1");
    client
        .query_opt(sql.as_str(), &[&value])
        .map_err(|e| map_pg_error("Failed to load circulation", e))?
        .as_ref()
        .map(circulation_from_row)
        .transpose()
}

fn count_rows<C: GenericClient>(client: &mut C, table: &str) -> Result<u64> {
    let total: i64 = client
        .query_one(format!("SELECT COUNT(*) FROM {table}").as_str(), &[])
        .map_err(|e| map_pg_error("Failed to count rows", e))?
        .get(0);
    Ok(u64::try_from(total).unwrap_or_default())
}

fn page_bounds(request: PageRequest) -> (i64, i64) {
    (
        i64::from(request.per_page),
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
    )
}

/// Member, book and circulation store backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: DatabasePool,
}

impl PostgresCatalog {
    /// Create a catalog over an existing pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PostgresCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCatalog")
            .field("pool", &self.pool.stats())
            .finish()
    }
}

#[async_trait]
impl MemberRepository for PostgresCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Member>> {
        let id = id.to_string();
        self.pool
            .run(move |client| find_member(client, "id", &id))
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Member>> {
        let name = name.to_string();
        self.pool
            .run(move |client| find_member(client, "name", &name))
            .await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Member>> {
        let phone = phone.to_string();
        self.pool
            .run(move |client| find_member(client, "phone", &phone))
            .await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Member>> {
        self.pool
            .run(move |client| {
                let total = count_rows(client, MEMBERS.table)?;
                let (limit, offset) = page_bounds(request);
                let sql = format!(
                    "{MEMBER_SELECT} ORDER BY length(code), code LIMIT $1 OFFSET $2"
                );
                let items = client
                    .query(sql.as_str(), &[&limit, &offset])
                    .map_err(|e| map_pg_error("Failed to list members", e))?
                    .iter()
                    .map(member_from_row)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Page::new(items, request, total))
            })
            .await
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        let id = Uuid::new_v4().to_string();
        self.pool
            .run(move |client| {
                insert_with_code(client, MEMBERS, |tx, code| {
                    tx.execute(
                        "INSERT INTO members (id, code, name, gender, class, phone, photo)
                         VALUES ($1, $2, $3, $4, $5, $6, $7)",
                        &[
                            &id,
                            &code,
                            &member.name,
                            &member.gender.as_str(),
                            &member.class,
                            &member.phone,
                            &member.photo,
                        ],
                    )
                })?;
                find_member(client, "id", &id)?
                    .ok_or_else(|| Error::internal("Created member vanished before read-back"))
            })
            .await
    }

    async fn update(&self, id: &str, patch: MemberPatch) -> Result<Member> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let changed = client
                    .execute(
                        "UPDATE members SET
                             name = COALESCE($2, name),
                             gender = COALESCE($3, gender),
                             class = COALESCE($4, class),
                             phone = COALESCE($5, phone),
                             photo = COALESCE($6, photo),
                             updated_at = NOW()
                         WHERE id = $1",
                        &[
                            &id,
                            &patch.name,
                            &patch.gender.map(|g| g.as_str()),
                            &patch.class,
                            &patch.phone,
                            &patch.photo,
                        ],
                    )
                    .map_err(|e| map_pg_error("Failed to update member", e))?;
                if changed == 0 {
                    return Err(Error::not_found(format!("member:{id}")));
                }
                find_member(client, "id", &id)?
                    .ok_or_else(|| Error::not_found(format!("member:{id}")))
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let removed = client
                    .execute("DELETE FROM members WHERE id = $1", &[&id])
                    .map_err(|e| map_pg_error("Failed to delete member", e))?;
                if removed == 0 {
                    return Err(Error::not_found(format!("member:{id}")));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl BookRepository for PostgresCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Book>> {
        let id = id.to_string();
        self.pool
            .run(move |client| find_book(client, "id", &id))
            .await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        let title = title.to_string();
        self.pool
            .run(move |client| find_book(client, "title", &title))
            .await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Book>> {
        self.pool
            .run(move |client| {
                let total = count_rows(client, BOOKS.table)?;
                let (limit, offset) = page_bounds(request);
                let sql = format!("{BOOK_SELECT} ORDER BY length(code), code LIMIT $1 OFFSET $2");
                let items = client
                    .query(sql.as_str(), &[&limit, &offset])
                    .map(|rows| rows.iter().map(book_from_row).collect())
                    .map_err(|e| map_pg_error("Failed to list books", e))?;
                Ok(Page::new(items, request, total))
            })
            .await
    }

    async fn create(&self, book: NewBook) -> Result<Book> {
        let id = Uuid::new_v4().to_string();
        self.pool
            .run(move |client| {
                insert_with_code(client, BOOKS, |tx, code| {
                    tx.execute(
                        "INSERT INTO books (id, code, title, cover, document, author, publisher, year)
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                        &[
                            &id,
                            &code,
                            &book.title,
                            &book.cover,
                            &book.document,
                            &book.author,
                            &book.publisher,
                            &book.year,
                        ],
                    )
                })?;
                find_book(client, "id", &id)?
                    .ok_or_else(|| Error::internal("Created book vanished before read-back"))
            })
            .await
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let changed = client
                    .execute(
                        "UPDATE books SET
                             title = COALESCE($2, title),
                             cover = COALESCE($3, cover),
                             document = COALESCE($4, document),
                             author = COALESCE($5, author),
                             publisher = COALESCE($6, publisher),
                             year = COALESCE($7, year),
                             updated_at = NOW()
                         WHERE id = $1",
                        &[
                            &id,
                            &patch.title,
                            &patch.cover,
                            &patch.document,
                            &patch.author,
                            &patch.publisher,
                            &patch.year,
                        ],
                    )
                    .map_err(|e| map_pg_error("Failed to update book", e))?;
                if changed == 0 {
                    return Err(Error::not_found(format!("book:{id}")));
                }
                find_book(client, "id", &id)?.ok_or_else(|| Error::not_found(format!("book:{id}")))
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let removed = client
                    .execute("DELETE FROM books WHERE id = $1", &[&id])
                    .map_err(|e| map_pg_error("Failed to delete book", e))?;
                if removed == 0 {
                    return Err(Error::not_found(format!("book:{id}")));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl CirculationRepository for PostgresCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Circulation>> {
        let id = id.to_string();
        self.pool
            .run(move |client| find_circulation(client, "id = $1", &id))
            .await
    }

    async fn find_open_by_book(&self, book_id: &str) -> Result<Option<Circulation>> {
        let book_id = book_id.to_string();
        self.pool
            .run(move |client| {
                find_circulation(client, "book_id = $1 AND returned_on IS NULL", &book_id)
            })
            .await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Circulation>> {
        self.pool
            .run(move |client| {
                let total = count_rows(client, CIRCULATIONS.table)?;
                let (limit, offset) = page_bounds(request);
                let sql = format!(
                    "{CIRCULATION_SELECT} ORDER BY length(code), code LIMIT $1 OFFSET $2"
                );
                let items = client
                    .query(sql.as_str(), &[&limit, &offset])
                    .map_err(|e| map_pg_error("Failed to list circulations", e))?
                    .iter()
                    .map(circulation_from_row)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Page::new(items, request, total))
            })
            .await
    }

    async fn create(&self, circulation: NewCirculation) -> Result<Circulation> {
        let id = Uuid::new_v4().to_string();
        let borrowed_on = circulation.borrowed_on.to_string();
        let due_on = circulation.due_on.to_string();
        self.pool
            .run(move |client| {
                insert_with_code(client, CIRCULATIONS, |tx, code| {
                    tx.execute(
                        "INSERT INTO circulations (id, code, member_id, book_id, borrowed_on, due_on, fine)
                         VALUES ($1, $2, $3, $4, $5::TEXT::DATE, $6::TEXT::DATE, $7)",
                        &[
                            &id,
                            &code,
                            &circulation.member_id,
                            &circulation.book_id,
                            &borrowed_on,
                            &due_on,
                            &circulation.fine,
                        ],
                    )
                })?;
                find_circulation(client, "id = $1", &id)?
                    .ok_or_else(|| Error::internal("Created circulation vanished before read-back"))
            })
            .await
    }

    async fn update(&self, id: &str, patch: CirculationPatch) -> Result<Circulation> {
        let id = id.to_string();
        let borrowed_on = patch.borrowed_on.map(|d| d.to_string());
        let due_on = patch.due_on.map(|d| d.to_string());
        self.pool
            .run(move |client| {
                let changed = client
                    .execute(
                        "UPDATE circulations SET
                             member_id = COALESCE($2, member_id),
                             book_id = COALESCE($3, book_id),
                             borrowed_on = COALESCE($4::TEXT::DATE, borrowed_on),
                             due_on = COALESCE($5::TEXT::DATE, due_on),
                             fine = COALESCE($6, fine),
                             updated_at = NOW()
                         WHERE id = $1",
                        &[
                            &id,
                            &patch.member_id,
                            &patch.book_id,
                            &borrowed_on,
                            &due_on,
                            &patch.fine,
                        ],
                    )
                    .map_err(|e| map_pg_error("Failed to update circulation", e))?;
                if changed == 0 {
                    return Err(Error::not_found(format!("circulation:{id}")));
                }
                find_circulation(client, "id = $1", &id)?
                    .ok_or_else(|| Error::not_found(format!("circulation:{id}")))
            })
            .await
    }

    async fn mark_returned(&self, id: &str, returned: CirculationReturn) -> Result<Circulation> {
        let id = id.to_string();
        let returned_on = returned.returned_on.to_string();
        self.pool
            .run(move |client| {
                let closed = client
                    .execute(
                        "UPDATE circulations SET
                             returned_on = $2::TEXT::DATE,
                             fine = $3,
                             updated_at = NOW()
                         WHERE id = $1 AND returned_on IS NULL",
                        &[&id, &returned_on, &returned.fine],
                    )
                    .map_err(|e| map_pg_error("Failed to return circulation", e))?;
                let loan = find_circulation(client, "id = $1", &id)?
                    .ok_or_else(|| Error::not_found(format!("circulation:{id}")))?;
                if closed == 0 {
                    return Err(Error::invalid_argument(format!(
                        "Loan {} was already returned",
                        loan.code
                    )));
                }
                Ok(loan)
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let removed = client
                    .execute("DELETE FROM circulations WHERE id = $1", &[&id])
                    .map_err(|e| map_pg_error("Failed to delete circulation", e))?;
                if removed == 0 {
                    return Err(Error::not_found(format!("circulation:{id}")));
                }
                Ok(())
            })
            .await
    }
}
