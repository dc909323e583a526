//! URL slug type for catalog item detail pages.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The title contains no ASCII letters or digits.
    #[error("title must contain at least one letter or digit")]
    Empty,
    /// No free slug was found within the suffix limit.
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted {
        /// The base slug that kept colliding.
        base: String,
        /// How many candidates were tried.
        attempts: u32,
    },
}

/// A URL-safe item slug.
///
/// ## Constraints
///
/// - Only lowercase ASCII letters, digits and `-`
/// - No leading, trailing or repeated `-`
///
/// ## Examples
///
/// ```
/// use ximy_core::Slug;
///
/// let slug = Slug::from_title("Levi's 501 — Made in USA!").unwrap();
/// assert_eq!(slug.as_str(), "levi-s-501-made-in-usa");
///
/// assert!(Slug::from_title("???").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Upper bound on suffixes tried by [`Slug::unique`].
    pub const MAX_SUFFIX: u32 = 1000;

    /// Derive a slug from an item title.
    ///
    /// Lowercases the title, collapses every run of characters outside
    /// `[a-z0-9]` into a single `-` and trims `-` from both ends.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if nothing is left after normalisation.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        for c in title.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(slug))
    }

    /// Wrap an already-normalised slug read back from storage.
    ///
    /// No validation is performed; use [`Slug::from_title`] for user input.
    #[must_use]
    pub fn from_stored(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The slug with a numeric suffix, e.g. `denim-jacket-2`.
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// Find the first free slug: the base itself, then `base-2`, `base-3`, ...
    ///
    /// `is_taken` is asked about each candidate in order.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Exhausted` if every candidate up to
    /// [`Slug::MAX_SUFFIX`] is taken.
    pub fn unique(&self, mut is_taken: impl FnMut(&Self) -> bool) -> Result<Self, SlugError> {
        if !is_taken(self) {
            return Ok(self.clone());
        }
        (2..=Self::MAX_SUFFIX)
            .map(|n| self.with_suffix(n))
            .find(|candidate| !is_taken(candidate))
            .ok_or_else(|| SlugError::Exhausted {
                base: self.0.clone(),
                attempts: Self::MAX_SUFFIX,
            })
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the slug and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
