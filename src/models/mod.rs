//! Data models
//!
//! This module contains all data structures used throughout the Brightfold
//! backend. Models represent:
//! - Database entities (Post, Offering, Author, ContactSubmission, ...)
//! - API request/response inputs
//! - Pagination and analytics value types

mod author;
mod category;
mod contact;
mod gallery;
mod offering;
mod page_view;
mod post;
mod session;
mod tag;
mod user;

pub use author::{Author, CreateAuthorInput, UpdateAuthorInput};
pub use category::{Category, CategoryWithCount, CreateCategoryInput, UpdateCategoryInput};
pub use contact::{
    ContactSubmission, CreateSubmissionInput, SubmissionStatus, UpdateSubmissionInput,
};
pub use gallery::{
    CreateGroupInput, CreateImageInput, GalleryGroup, GalleryGroupWithImages, GalleryImage,
    UpdateImageInput,
};
pub use offering::{
    CreateOfferingInput, FaqInput, FeatureInput, Offering, OfferingBenefit, OfferingDetail,
    OfferingFaq, OfferingFeature, OfferingStatus, PricingTier, PricingTierInput,
    UpdateOfferingInput,
};
pub use page_view::{AnalyticsBucket, PageView, PathViewCount, ViewBucket, ViewSummary};
pub use post::{
    BulkPostAction, CreatePostInput, ListParams, PagedResult, Post, PostFilter, PostStatus,
    PostWithMeta, UpdatePostInput,
};
pub use session::Session;
pub use tag::{Tag, TagWithCount};
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole};
