//! Fragment transport seam
//!
//! Views never talk to the server directly; every fetch and submit goes
//! through a [`FragmentClient`]. Production uses the reqwest-backed
//! [`http::HttpFragmentClient`]; tests script a stub.

use async_trait::async_trait;

use replipanel_core::Result;

#[cfg(feature = "http-client")]
pub mod http;

/// Server collaborator returning rendered HTML fragments.
#[async_trait]
pub trait FragmentClient: Send + Sync {
    /// GET the fragment at `url` (panel-relative).
    async fn get_fragment(&self, url: &str) -> Result<String>;

    /// POST a form submission to `url` and return the response body.
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String>;
}
