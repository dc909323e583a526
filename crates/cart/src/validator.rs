//! Remote availability check.
//!
//! A validator answers one question for a batch of items: which of these are
//! still purchasable right now. It never caches. Callers decide what a failed
//! check means; see [`CartController`](crate::CartController).

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use ximy_core::{ItemId, ValidateRequest, ValidateResponse};

/// Path of the storefront's availability endpoint, relative to its base URL.
pub const VALIDATE_PATH: &str = "api/cart/validate";

/// Default request timeout for [`HttpValidator`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that mean "availability unknown".
///
/// None of these say anything about the items themselves: a definitive
/// "not available" is an `Ok` result that omits the item.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// HTTP request failed (connection refused, DNS, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("availability check returned HTTP {0}")]
    Status(u16),

    /// No answer within the deadline.
    #[error("availability check timed out after {0:?}")]
    Timeout(Duration),

    /// Any other transport failure.
    #[error("availability check failed: {0}")]
    Transport(String),
}

/// The purchasable subset of a batch of items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    available: HashSet<ItemId>,
}

impl Availability {
    /// Build from the IDs reported as purchasable.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            available: ids.into_iter().collect(),
        }
    }

    /// Whether `id` was reported purchasable.
    #[must_use]
    pub fn is_available(&self, id: &ItemId) -> bool {
        self.available.contains(id)
    }

    /// Number of purchasable items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.available.len()
    }

    /// Whether no item was reported purchasable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

/// A remote source of truth for item availability.
pub trait AvailabilityValidator {
    /// Return which of `ids` are currently purchasable.
    ///
    /// `ids` may contain duplicates. Implementations must not cache.
    fn check(
        &self,
        ids: &[ItemId],
    ) -> impl Future<Output = Result<Availability, ValidatorError>> + Send;
}

// =============================================================================
// HttpValidator
// =============================================================================

/// Validator backed by the storefront's `POST /api/cart/validate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpValidator {
    /// Create a validator for the storefront at `base_url`.
    ///
    /// A path prefix on `base_url` is kept: `https://host/shop` checks
    /// availability at `https://host/shop/api/cart/validate`.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::Transport` if `base_url` cannot be joined with
    /// the endpoint path, or `ValidatorError::Http` if the client fails to build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ValidatorError> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(VALIDATE_PATH)
            .map_err(|e| ValidatorError::Transport(format!("invalid storefront URL: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Full URL of the availability endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AvailabilityValidator for HttpValidator {
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn check(&self, ids: &[ItemId]) -> Result<Availability, ValidatorError> {
        let item_ids = dedup(ids);
        if item_ids.is_empty() {
            return Ok(Availability::default());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ValidateRequest { item_ids })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValidatorError::Status(status.as_u16()));
        }

        let body: ValidateResponse = response.json().await.map_err(|e| self.classify(e))?;
        debug!(valid = body.valid_ids.len(), "availability check answered");

        Ok(Availability::from_ids(body.valid_ids))
    }
}

impl HttpValidator {
    fn classify(&self, error: reqwest::Error) -> ValidatorError {
        if error.is_timeout() {
            ValidatorError::Timeout(self.timeout)
        } else {
            ValidatorError::Http(error)
        }
    }
}

/// Drop repeated IDs, keeping first-seen order.
fn dedup(ids: &[ItemId]) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let ids = vec![
            ItemId::new("b"),
            ItemId::new("a"),
            ItemId::new("b"),
            ItemId::new("c"),
            ItemId::new("a"),
        ];
        assert_eq!(
            dedup(&ids),
            vec![ItemId::new("b"), ItemId::new("a"), ItemId::new("c")]
        );
    }

    #[test]
    fn test_availability_membership() {
        let availability = Availability::from_ids([ItemId::new("a"), ItemId::new("a")]);
        assert_eq!(availability.len(), 1);
        assert!(availability.is_available(&ItemId::new("a")));
        assert!(!availability.is_available(&ItemId::new("b")));
    }

    #[test]
    fn test_endpoint_is_rooted() {
        let base = Url::parse("http://127.0.0.1:3000").unwrap();
        let validator = HttpValidator::new(&base, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            validator.endpoint().as_str(),
            "http://127.0.0.1:3000/api/cart/validate"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        for base in ["https://ximy.my/shop", "https://ximy.my/shop/"] {
            let validator =
                HttpValidator::new(&Url::parse(base).unwrap(), DEFAULT_TIMEOUT).unwrap();
            assert_eq!(
                validator.endpoint().as_str(),
                "https://ximy.my/shop/api/cart/validate"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        // Nothing listens on port 9; any request would fail.
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let validator = HttpValidator::new(&base, DEFAULT_TIMEOUT).unwrap();

        let availability = validator.check(&[]).await.unwrap();
        assert!(availability.is_empty());
    }
}
