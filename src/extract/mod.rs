//! Content extractors, one per content shape.
//!
//! Each extractor follows the same contract: take a fetched document (or a
//! URL plus the shared fetcher), produce transient in-memory results, and
//! report failure as a typed value rather than an exception. The caller
//! hands results to the content store.
//!
//! | Shape | Module | Method |
//! |-------|--------|--------|
//! | Portal listing | [`headlines`] | Per-portal selector groups, prioritized fallback |
//! | Single article | [`article`] | Generic paragraph-density content model |
//! | YouTube video | [`transcript`] | Caption track discovery + timedtext parse |

pub mod article;
pub mod headlines;
pub mod transcript;
