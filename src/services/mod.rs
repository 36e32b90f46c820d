//! Services layer - business logic
//!
//! Services implement the rules between the HTTP surface and the
//! repositories: validation, slug management, markdown rendering, cache
//! invalidation, and outbound side effects (mail, indexing pings, AI
//! providers).

pub mod ai;
pub mod analytics;
pub mod author;
pub mod category;
pub mod contact;
pub mod email;
pub mod gallery;
pub mod indexing;
pub mod markdown;
pub mod offering;
pub mod password;
pub mod post;
pub mod rate_limiter;
pub mod slug;
pub mod tag;
pub mod user;

pub use ai::{
    AiService, AiServiceError, GeneratedFaq, GeneratedListItem, GeneratedOfferingDraft,
    GeneratedPostDraft,
};
pub use analytics::{AnalyticsReport, AnalyticsService, AnalyticsServiceError};
pub use author::{AuthorService, AuthorServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use contact::{ContactService, ContactServiceError};
pub use email::{BulkSendOutcome, BulkSendResult, EmailService, EmailServiceError};
pub use gallery::{GalleryService, GalleryServiceError};
pub use indexing::IndexingService;
pub use markdown::MarkdownRenderer;
pub use offering::{OfferingService, OfferingServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
pub use rate_limiter::{EmailRateLimiter, LoginRateLimiter};
pub use slug::generate_slug;
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
