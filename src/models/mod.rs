//! Data models for the admin dashboard.
//!
//! JSON shapes match the dashboard's camelCase records.

mod category;
mod course;
mod datastore;
mod ebook;
mod entity;
mod job;
mod lecture;
mod subscription;
mod user;

pub use category::*;
pub use course::*;
pub use datastore::*;
pub use ebook::*;
pub use entity::*;
pub use job::*;
pub use lecture::*;
pub use subscription::*;
pub use user::*;
