//! Members, books and circulation

use chrono::NaiveDate;
use libris_domain::entities::{
    Book, BookPatch, Circulation, CirculationPatch, CirculationReturn, Member, MemberPatch,
    NewBook, NewCirculation, NewMember,
};
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{BookRepository, CirculationRepository, MemberRepository};
use libris_domain::value_objects::{Page, PageRequest};
use std::sync::Arc;
use tracing::info;

/// True when `found` exists and is not the record being updated
fn taken_by_other(found_id: Option<&str>, except: Option<&str>) -> bool {
    matches!(found_id, Some(id) if Some(id) != except)
}

/// Member CRUD; names and phone numbers are unique
#[derive(Clone)]
pub struct MemberService {
    members: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Member>> {
        self.members.list(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Member> {
        self.members
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("member:{id}")))
    }

    /// Create a member; the code is generated by the store
    pub async fn create(&self, member: NewMember) -> Result<Member> {
        self.ensure_unique(Some(&member.name), Some(&member.phone), None)
            .await?;
        let member = self.members.create(member).await?;
        info!(member_id = %member.id, code = %member.code, "Member created");
        Ok(member)
    }

    pub async fn update(&self, id: &str, patch: MemberPatch) -> Result<Member> {
        self.ensure_unique(patch.name.as_deref(), patch.phone.as_deref(), Some(id))
            .await?;
        self.members.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.members.delete(id).await?;
        info!(member_id = id, "Member deleted");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        except: Option<&str>,
    ) -> Result<()> {
        if let Some(name) = name {
            let found = self.members.find_by_name(name).await?;
            if taken_by_other(found.as_ref().map(|m| m.id.as_str()), except) {
                return Err(Error::already_exists(format!("member name {name}")));
            }
        }
        if let Some(phone) = phone {
            let found = self.members.find_by_phone(phone).await?;
            if taken_by_other(found.as_ref().map(|m| m.id.as_str()), except) {
                return Err(Error::already_exists(format!("member phone {phone}")));
            }
        }
        Ok(())
    }
}

/// Book CRUD; titles are unique
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Book>> {
        self.books.list(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Book> {
        self.books
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("book:{id}")))
    }

    pub async fn create(&self, book: NewBook) -> Result<Book> {
        self.ensure_unique_title(&book.title, None).await?;
        let book = self.books.create(book).await?;
        info!(book_id = %book.id, code = %book.code, "Book created");
        Ok(book)
    }

    pub async fn update(&self, id: &str, patch: BookPatch) -> Result<Book> {
        if let Some(title) = patch.title.as_deref() {
            self.ensure_unique_title(title, Some(id)).await?;
        }
        self.books.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.books.delete(id).await?;
        info!(book_id = id, "Book deleted");
        Ok(())
    }

    async fn ensure_unique_title(&self, title: &str, except: Option<&str>) -> Result<()> {
        let found = self.books.find_by_title(title).await?;
        if taken_by_other(found.as_ref().map(|b| b.id.as_str()), except) {
            return Err(Error::already_exists(format!("book title {title}")));
        }
        Ok(())
    }
}

/// Lending books to members
///
/// A loan needs an existing member and an existing book that is not
/// already out on another open loan. The due day may not precede the
/// borrowing day.
#[derive(Clone)]
pub struct CirculationService {
    circulations: Arc<dyn CirculationRepository>,
    members: Arc<dyn MemberRepository>,
    books: Arc<dyn BookRepository>,
}

impl CirculationService {
    pub fn new(
        circulations: Arc<dyn CirculationRepository>,
        members: Arc<dyn MemberRepository>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            circulations,
            members,
            books,
        }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Circulation>> {
        self.circulations.list(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Circulation> {
        self.circulations
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("circulation:{id}")))
    }

    /// Lend a book; the `SKL` code is generated by the store
    pub async fn borrow(&self, loan: NewCirculation) -> Result<Circulation> {
        check_dates(loan.borrowed_on, loan.due_on)?;
        check_fine(loan.fine)?;
        self.ensure_member(&loan.member_id).await?;
        self.ensure_lendable(&loan.book_id, None).await?;

        let loan = self.circulations.create(loan).await?;
        info!(
            circulation_id = %loan.id,
            code = %loan.code,
            member_id = %loan.member_id,
            book_id = %loan.book_id,
            "Book lent"
        );
        Ok(loan)
    }

    /// Close an open loan
    pub async fn return_book(&self, id: &str, returned: CirculationReturn) -> Result<Circulation> {
        check_fine(returned.fine)?;
        let current = self.get(id).await?;
        if returned.returned_on < current.borrowed_on {
            return Err(Error::invalid_argument("Return day precedes the borrowing day"));
        }

        let loan = self.circulations.mark_returned(id, returned).await?;
        info!(circulation_id = id, code = %loan.code, fine = loan.fine, "Book returned");
        Ok(loan)
    }

    pub async fn update(&self, id: &str, patch: CirculationPatch) -> Result<Circulation> {
        let current = self.get(id).await?;
        check_dates(
            patch.borrowed_on.unwrap_or(current.borrowed_on),
            patch.due_on.unwrap_or(current.due_on),
        )?;
        if let Some(fine) = patch.fine {
            check_fine(fine)?;
        }
        if let Some(member_id) = patch.member_id.as_deref() {
            self.ensure_member(member_id).await?;
        }
        if let Some(book_id) = patch.book_id.as_deref() {
            if current.is_open() && book_id != current.book_id {
                self.ensure_lendable(book_id, Some(id)).await?;
            } else {
                self.ensure_book(book_id).await?;
            }
        }
        self.circulations.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.circulations.delete(id).await?;
        info!(circulation_id = id, "Circulation deleted");
        Ok(())
    }

    async fn ensure_member(&self, member_id: &str) -> Result<()> {
        match self.members.get_by_id(member_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("member:{member_id}"))),
        }
    }

    async fn ensure_book(&self, book_id: &str) -> Result<()> {
        match self.books.get_by_id(book_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("book:{book_id}"))),
        }
    }

    /// The book exists and no open loan other than `except` holds it
    async fn ensure_lendable(&self, book_id: &str, except: Option<&str>) -> Result<()> {
        self.ensure_book(book_id).await?;
        let open = self.circulations.find_open_by_book(book_id).await?;
        if let Some(open) = open.filter(|loan| Some(loan.id.as_str()) != except) {
            return Err(Error::already_exists(format!(
                "book {book_id} is out on loan {}",
                open.code
            )));
        }
        Ok(())
    }
}

fn check_dates(borrowed_on: NaiveDate, due_on: NaiveDate) -> Result<()> {
    if due_on < borrowed_on {
        return Err(Error::invalid_argument("Due day precedes the borrowing day"));
    }
    Ok(())
}

fn check_fine(fine: i64) -> Result<()> {
    if fine < 0 {
        return Err(Error::invalid_argument("Fine cannot be negative"));
    }
    Ok(())
}
