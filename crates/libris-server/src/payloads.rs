//! Request bodies
//!
//! Bodies are validated with `validator` before they reach a service.
//! Patch bodies accept any subset of fields; a present field obeys the
//! same rules as on creation.

use crate::responses::ApiError;
use chrono::{NaiveDate, Utc};
use libris_domain::entities::{
    BookPatch, CirculationPatch, CirculationReturn, Gender, MemberPatch, NewBook,
    NewCirculation, NewMember,
};
use libris_domain::error::Result;
use libris_domain::value_objects::RoleName;
use libris_infrastructure::services::{NewUser, UserChanges};
use rocket::serde::json::Json;
use serde::Deserialize;
use validator::Validate;

/// Unwrap a JSON body and run its validation rules
pub fn validated<T: Validate>(body: Json<T>) -> std::result::Result<T, ApiError> {
    let body = body.into_inner();
    body.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(body)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub avatar: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            avatar: req.avatar,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub avatar: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        UserChanges {
            name: req.name,
            email: req.email,
            avatar: req.avatar,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoleRequest {
    #[validate(length(min = 3, message = "Role name must be at least 3 characters"))]
    pub name: String,
}

impl RoleRequest {
    /// Parse into one of the fixed role names
    pub fn role_name(&self) -> Result<RoleName> {
        self.name.trim().to_lowercase().parse()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRoleRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "role_id is required"))]
    pub role_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub gender: String,
    #[validate(length(min = 1, message = "Class is required"))]
    pub class: String,
    #[validate(length(min = 6, message = "Phone must be at least 6 characters"))]
    pub phone: String,
    pub photo: Option<String>,
}

impl CreateMemberRequest {
    pub fn into_new_member(self) -> Result<NewMember> {
        Ok(NewMember {
            gender: self.gender.parse::<Gender>()?,
            name: self.name,
            class: self.class,
            phone: self.phone,
            photo: self.photo,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub gender: Option<String>,
    #[validate(length(min = 1, message = "Class cannot be empty"))]
    pub class: Option<String>,
    #[validate(length(min = 6, message = "Phone must be at least 6 characters"))]
    pub phone: Option<String>,
    pub photo: Option<String>,
}

impl UpdateMemberRequest {
    pub fn into_patch(self) -> Result<MemberPatch> {
        let gender = self.gender.as_deref().map(str::parse::<Gender>).transpose()?;
        Ok(MemberPatch {
            name: self.name,
            gender,
            class: self.class,
            phone: self.phone,
            photo: self.photo,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Publisher is required"))]
    pub publisher: String,
    #[validate(range(min = 1, max = 9999, message = "Year must be between 1 and 9999"))]
    pub year: i32,
    pub cover: Option<String>,
    pub document: Option<String>,
}

impl From<CreateBookRequest> for NewBook {
    fn from(req: CreateBookRequest) -> Self {
        NewBook {
            title: req.title,
            author: Some(req.author),
            publisher: Some(req.publisher),
            year: Some(req.year),
            cover: req.cover,
            document: req.document,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Publisher cannot be empty"))]
    pub publisher: Option<String>,
    #[validate(range(min = 1, max = 9999, message = "Year must be between 1 and 9999"))]
    pub year: Option<i32>,
    pub cover: Option<String>,
    pub document: Option<String>,
}

impl From<UpdateBookRequest> for BookPatch {
    fn from(req: UpdateBookRequest) -> Self {
        BookPatch {
            title: req.title,
            author: req.author,
            publisher: req.publisher,
            year: req.year,
            cover: req.cover,
            document: req.document,
        }
    }
}

/// Dates are `YYYY-MM-DD`
#[derive(Debug, Deserialize, Validate)]
pub struct BorrowRequest {
    #[validate(length(min = 1, message = "member_id is required"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "book_id is required"))]
    pub book_id: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    #[validate(range(min = 0, message = "Fine cannot be negative"))]
    pub fine: Option<i64>,
}

impl From<BorrowRequest> for NewCirculation {
    fn from(req: BorrowRequest) -> Self {
        NewCirculation {
            member_id: req.member_id,
            book_id: req.book_id,
            borrowed_on: req.borrowed_on,
            due_on: req.due_on,
            fine: req.fine.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCirculationRequest {
    #[validate(length(min = 1, message = "member_id cannot be empty"))]
    pub member_id: Option<String>,
    #[validate(length(min = 1, message = "book_id cannot be empty"))]
    pub book_id: Option<String>,
    pub borrowed_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Fine cannot be negative"))]
    pub fine: Option<i64>,
}

impl From<UpdateCirculationRequest> for CirculationPatch {
    fn from(req: UpdateCirculationRequest) -> Self {
        CirculationPatch {
            member_id: req.member_id,
            book_id: req.book_id,
            borrowed_on: req.borrowed_on,
            due_on: req.due_on,
            fine: req.fine,
        }
    }
}

/// Both fields optional: today, no fine
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReturnRequest {
    pub returned_on: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Fine cannot be negative"))]
    pub fine: Option<i64>,
}

impl From<ReturnRequest> for CirculationReturn {
    fn from(req: ReturnRequest) -> Self {
        CirculationReturn {
            returned_on: req.returned_on.unwrap_or_else(|| Utc::now().date_naive()),
            fine: req.fine.unwrap_or_default(),
        }
    }
}
