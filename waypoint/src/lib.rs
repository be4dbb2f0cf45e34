//! Waypoint &ndash; path-pattern compilation, matching and resolution for request routing.
//!
//! Route templates such as `/hotels/{hotel}/bookings/{booking:[0-9]+}`, `/static/**` or
//! `/files/{*path}` compile into an immutable [`Pattern`]. A pattern matches concrete paths in
//! full or by prefix, extracting captured variables along the way, and competing patterns are
//! ranked for a path by [`pattern::specificity::compare`].
//!
//! Large route tables are registered with a [`ResolverBuilder`] and frozen into a
//! [`Resolver`], a trie keyed by segment which finds every registration matching a path:
//!
//! ```rust
//! # use waypoint::ResolverBuilder;
//! # fn main() -> waypoint::Result<()> {
//! let mut builder = ResolverBuilder::new();
//! builder
//!     .add("GET", "/hotels/{hotel}", "show")?
//!     .add("GET", "/hotels/new", "new")?
//!     .add("GET", "/hotels/**", "fallback")?;
//! let resolver = builder.build();
//!
//! let best = resolver.resolve_best("GET", "/hotels/new")?.unwrap();
//! assert_eq!(*best.value(), "new");
//!
//! let best = resolver.resolve_best("GET", "/hotels/42")?.unwrap();
//! assert_eq!(*best.value(), "show");
//! assert_eq!(best.params()["hotel"], "42");
//! # Ok(())
//! # }
//! ```
//!
//! One-off matching of pattern text is served by [`PathMatcher`], which keeps recently used
//! patterns in a bounded [`PatternCache`].
#![doc(html_root_url = "https://docs.rs/waypoint/0.1.0")] // Update when changed in Cargo.toml
#![warn(missing_docs, deprecated)]
// Stricter requirements once we get to pull request stage, all warnings must be resolved.
#![cfg_attr(feature = "ci", deny(warnings))]
#![doc(test(no_crate_inject, attr(deny(warnings))))]

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod resolver;

pub use crate::cache::PatternCache;
pub use crate::config::{CacheOptions, PatternOptions};
pub use crate::error::{Error, Result};
pub use crate::matcher::PathMatcher;
pub use crate::pattern::{compile, Pattern};
pub use crate::resolver::{ConflictPolicy, Match, Resolver, ResolverBuilder};
