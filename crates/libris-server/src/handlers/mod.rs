//! Route handlers
//!
//! | Module | Routes |
//! |--------|--------|
//! | [`auth`] | `/login`, `/register`, `/logout`, `/logout-all`, `/profile` |
//! | [`users`] | `/users`, `/users/<id>` |
//! | [`roles`] | `/roles`, `/roles/<id>`, `/role_user`, `/users/<uid>/roles/<rid>` |
//! | [`catalog`] | `/members`, `/books` |
//! | [`circulation`] | `/circulations`, `/circulations/<id>/return` |
//! | [`health`] | `/health` |

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod health;
pub mod roles;
pub mod users;
