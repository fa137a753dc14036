//! The remote video catalog collaborator contract.

use crate::error::Result;
use crate::model::StreamManifest;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A remote catalog able to resolve a source identifier into a stream manifest.
///
/// The library never talks to the catalog service itself; implementations
/// wrap whatever knows about the source (an innertube client, a yt-dlp
/// process, a test double). Quality enumeration over the returned manifest is
/// provided by [`crate::model::selector`].
pub trait Catalog: Send + Sync {
    /// Fetches the stream manifest for the given source URL or identifier.
    ///
    /// Implementations should observe `cancel` and give up promptly once it
    /// is triggered; the downloader maps any error from this call (other than
    /// cancellation) to [`crate::error::Error::ManifestFetch`].
    fn fetch_manifest(
        &self,
        source: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<StreamManifest>> + Send;
}
