//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod author;
pub mod category;
pub mod contact;
pub mod gallery;
pub mod offering;
pub mod page_view;
pub mod post;
pub mod session;
pub mod tag;
pub mod user;

pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use gallery::{GalleryRepository, SqlxGalleryRepository};
pub use offering::{
    OfferingPatch, OfferingRepository, OfferingSubContent, SqlxOfferingRepository,
};
pub use page_view::{PageViewRepository, SqlxPageViewRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
