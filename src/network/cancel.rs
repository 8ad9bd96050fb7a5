//! Cancellation support for outbound calls

use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Drive `fut` to completion unless `token` fires first.
///
/// A token that is already cancelled wins without polling the future.
pub async fn with_cancellation<F, T>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}
