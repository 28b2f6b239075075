//! Remote content service.
//!
//! The sync engine talks to the server only through [`ContentService`], so
//! tests can substitute an in-memory implementation for
//! [`HttpContentService`].

mod client;
mod error;
mod protocol;

use async_trait::async_trait;

pub use client::HttpContentService;
pub use error::RemoteError;
pub use protocol::{
    GroupItem, GroupResponse, PagesResponse, SetGroupRequest, SetGroupResponse,
    UpdatePagesRequest, UpdatePagesResponse, UpdatedPage,
};

use crate::models::{Page, SpaGroup};

/// Logical operations of the content server.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Lists the custom pages stored on the server.
    async fn fetch_pages(&self) -> Result<PagesResponse, RemoteError>;

    /// Lists the read-only default pages.
    async fn fetch_default_pages(&self) -> Result<PagesResponse, RemoteError>;

    /// Stores a batch of pages and returns the pages the server updated.
    async fn submit_pages(&self, pages: &[Page]) -> Result<UpdatePagesResponse, RemoteError>;

    /// Fetches all files of an SPA group.
    async fn fetch_group(&self, group: SpaGroup) -> Result<GroupResponse, RemoteError>;

    /// Replaces all files of an SPA group.
    async fn submit_group(
        &self,
        group: SpaGroup,
        items: &[GroupItem],
    ) -> Result<SetGroupResponse, RemoteError>;
}
