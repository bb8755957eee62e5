//! In-memory member, book and circulation store

use super::{read_lock, write_lock};
use async_trait::async_trait;
use chrono::Utc;
use libris_domain::constants::{BOOK_CODE_PREFIX, CIRCULATION_CODE_PREFIX, MEMBER_CODE_PREFIX};
use libris_domain::entities::{
    Book, BookPatch, Circulation, CirculationPatch, CirculationReturn, Member, MemberPatch,
    NewBook, NewCirculation, NewMember,
};
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{BookRepository, CirculationRepository, MemberRepository};
use libris_domain::value_objects::{Page, PageRequest, SequenceCode};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

#[derive(Debug, Default)]
struct CatalogState {
    members: HashMap<String, Member>,
    books: HashMap<String, Book>,
    circulations: HashMap<String, Circulation>,
}

/// Orders codes by numeric value (`ID1000` sorts after `ID999`)
fn code_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn max_code<'a>(codes: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    codes.max_by(|a, b| code_order(a, b))
}

fn paginate<T: Clone>(mut items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let items: Vec<T> = if start >= items.len() {
        Vec::new()
    } else {
        items
            .drain(start..)
            .take(request.per_page as usize)
            .collect()
    };
    Page::new(items, request, total)
}

/// In-memory implementation of the member, book and circulation repositories
///
/// Code generation happens under the write lock, which gives the same
/// uniqueness guarantee as the serializable transaction used by PostgreSQL.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
    queries: AtomicU64,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls served so far
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MemberRepository for InMemoryCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Member>> {
        self.count();
        Ok(read_lock(&self.state)?.members.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Member>> {
        self.count();
        Ok(read_lock(&self.state)?
            .members
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Member>> {
        self.count();
        Ok(read_lock(&self.state)?
            .members
            .values()
            .find(|m| m.phone == phone)
            .cloned())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Member>> {
        self.count();
        let mut members: Vec<Member> = read_lock(&self.state)?.members.values().cloned().collect();
        members.sort_by(|a, b| code_order(&a.code, &b.code));
        Ok(paginate(members, request))
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let last = max_code(state.members.values().map(|m| m.code.as_str()));
        let code = SequenceCode::next_after(MEMBER_CODE_PREFIX, last)?;
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: member.name,
            gender: member.gender,
            class: member.class,
            phone: member.phone,
            photo: member.photo,
            created_at: now,
            updated_at: now,
        };
        state.members.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    async fn update(&self, id: &str, patch: MemberPatch) -> Result<Member> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let member = state
            .members
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("member:{id}")))?;
        if let Some(name) = patch.name {
            member.name = name;
        }
        if let Some(gender) = patch.gender {
            member.gender = gender;
        }
        if let Some(class) = patch.class {
            member.class = class;
        }
        if let Some(phone) = patch.phone {
            member.phone = phone;
        }
        if let Some(photo) = patch.photo {
            member.photo = Some(photo);
        }
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.count();
        write_lock(&self.state)?
            .members
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("member:{id}")))
    }
}

#[async_trait]
impl BookRepository for InMemoryCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Book>> {
        self.count();
        Ok(read_lock(&self.state)?.books.get(id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        self.count();
        Ok(read_lock(&self.state)?
            .books
            .values()
            .find(|b| b.title == title)
            .cloned())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Book>> {
        self.count();
        let mut books: Vec<Book> = read_lock(&self.state)?.books.values().cloned().collect();
        books.sort_by(|a, b| code_order(&a.code, &b.code));
        Ok(paginate(books, request))
    }

    async fn create(&self, book: NewBook) -> Result<Book> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let last = max_code(state.books.values().map(|b| b.code.as_str()));
        let code = SequenceCode::next_after(BOOK_CODE_PREFIX, last)?;
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            title: book.title,
            cover: book.cover,
            document: book.document,
            author: book.author,
            publisher: book.publisher,
            year: book.year,
            created_at: now,
            updated_at: now,
        };
        state.books.insert(book.id.clone(), book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let book = state
            .books
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("book:{id}")))?;
        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(cover) = patch.cover {
            book.cover = Some(cover);
        }
        if let Some(document) = patch.document {
            book.document = Some(document);
        }
        if let Some(author) = patch.author {
            book.author = Some(author);
        }
        if let Some(publisher) = patch.publisher {
            book.publisher = Some(publisher);
        }
        if let Some(year) = patch.year {
            book.year = Some(year);
        }
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.count();
        write_lock(&self.state)?
            .books
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("book:{id}")))
    }
}

#[async_trait]
impl CirculationRepository for InMemoryCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Circulation>> {
        self.count();
        Ok(read_lock(&self.state)?.circulations.get(id).cloned())
    }

    async fn find_open_by_book(&self, book_id: &str) -> Result<Option<Circulation>> {
        self.count();
        Ok(read_lock(&self.state)?
            .circulations
            .values()
            .find(|c| c.book_id == book_id && c.is_open())
            .cloned())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Circulation>> {
        self.count();
        let mut loans: Vec<Circulation> =
            read_lock(&self.state)?.circulations.values().cloned().collect();
        loans.sort_by(|a, b| code_order(&a.code, &b.code));
        Ok(paginate(loans, request))
    }

    async fn create(&self, circulation: NewCirculation) -> Result<Circulation> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let last = max_code(state.circulations.values().map(|c| c.code.as_str()));
        let code = SequenceCode::next_after(CIRCULATION_CODE_PREFIX, last)?;
        let now = Utc::now();
        let circulation = Circulation {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            member_id: circulation.member_id,
            book_id: circulation.book_id,
            borrowed_on: circulation.borrowed_on,
            due_on: circulation.due_on,
            returned_on: None,
            fine: circulation.fine,
            created_at: now,
            updated_at: now,
        };
        state
            .circulations
            .insert(circulation.id.clone(), circulation.clone());
        Ok(circulation)
    }

    async fn update(&self, id: &str, patch: CirculationPatch) -> Result<Circulation> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let loan = state
            .circulations
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("circulation:{id}")))?;
        if let Some(member_id) = patch.member_id {
            loan.member_id = member_id;
        }
        if let Some(book_id) = patch.book_id {
            loan.book_id = book_id;
        }
        if let Some(borrowed_on) = patch.borrowed_on {
            loan.borrowed_on = borrowed_on;
        }
        if let Some(due_on) = patch.due_on {
            loan.due_on = due_on;
        }
        if let Some(fine) = patch.fine {
            loan.fine = fine;
        }
        loan.updated_at = Utc::now();
        Ok(loan.clone())
    }

    async fn mark_returned(&self, id: &str, returned: CirculationReturn) -> Result<Circulation> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let loan = state
            .circulations
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("circulation:{id}")))?;
        if !loan.is_open() {
            return Err(Error::invalid_argument(format!(
                "Loan {} was already returned",
                loan.code
            )));
        }
        loan.returned_on = Some(returned.returned_on);
        loan.fine = returned.fine;
        loan.updated_at = Utc::now();
        Ok(loan.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.count();
        write_lock(&self.state)?
            .circulations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("circulation:{id}")))
    }
}
