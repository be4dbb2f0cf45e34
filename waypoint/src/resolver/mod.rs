//! Resolves a path against many registered patterns at once.
//!
//! Patterns are registered on a `ResolverBuilder` under a dispatch key (typically a request
//! method) and frozen into a `Resolver` by `build`. The resolver walks a trie of segment keys
//! with full backtracking, so every registration able to match a path is reported, not just
//! the first.

pub mod node;
pub mod segment;

use std::cmp::Ordering;

use linked_hash_map::LinkedHashMap;
use log::{debug, trace};
use serde::Deserialize;

use crate::config::PatternOptions;
use crate::error::{Error, Result};
use crate::path::PathContainer;
use crate::pattern::specificity;
use crate::pattern::Pattern;
use crate::resolver::node::{Leaf, Node, NodeBuilder, Visit};
use crate::resolver::segment::SegmentKey;

/// What a `ResolverBuilder` does when a registration has the same dispatch key and shape as an
/// earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Reject the registration with a `ConflictError`.
    Strict,

    /// Replace the earlier value if the pattern text is identical, otherwise keep both.
    Lax,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        ConflictPolicy::Strict
    }
}

/// One registration matching a resolved path.
#[derive(Debug)]
pub struct Match<'a, T> {
    value: &'a T,
    params: LinkedHashMap<String, String>,
    dispatch_key: &'a str,
    pattern: &'a Pattern,
    registration: usize,
}

impl<'a, T> Match<'a, T> {
    /// The registered value.
    pub fn value(&self) -> &'a T {
        self.value
    }

    /// Captured variables, in declaration order.
    pub fn params(&self) -> &LinkedHashMap<String, String> {
        &self.params
    }

    /// The dispatch key the value was registered under.
    pub fn dispatch_key(&self) -> &'a str {
        self.dispatch_key
    }

    /// The pattern the value was registered with.
    pub fn pattern(&self) -> &'a Pattern {
        self.pattern
    }

    /// Consumes the match, returning the captured variables.
    pub fn into_params(self) -> LinkedHashMap<String, String> {
        self.params
    }
}

/// Collects registrations into a trie, then freezes it into a `Resolver`.
///
/// # Examples
///
/// ```rust
/// # use waypoint::resolver::ResolverBuilder;
/// # fn main() -> waypoint::error::Result<()> {
/// let mut builder = ResolverBuilder::new();
/// builder
///     .add("GET", "/hotels/{hotel}", "show")?
///     .add("GET", "/hotels/new", "new")?;
/// let resolver = builder.build();
///
/// let found = resolver.resolve_all("GET", "/hotels/new")?;
/// assert_eq!(found.len(), 2);
///
/// let best = resolver.resolve_best("GET", "/hotels/new")?.unwrap();
/// assert_eq!(*best.value(), "new");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResolverBuilder<T> {
    options: PatternOptions,
    policy: ConflictPolicy,
    root: NodeBuilder<T>,
    registrations: usize,
}

impl<T> ResolverBuilder<T> {
    /// Creates a strict builder with default pattern options.
    pub fn new() -> Self {
        ResolverBuilder::with_options(PatternOptions::default())
    }

    /// Creates a strict builder compiling patterns with `options`.
    ///
    /// `inner_double_wildcard` is always switched off: the trie only accepts `**` as the final
    /// segment of a pattern.
    pub fn with_options(options: PatternOptions) -> Self {
        trace!(" creating new resolver builder");
        ResolverBuilder {
            options: options.with_inner_double_wildcard(false),
            policy: ConflictPolicy::default(),
            root: NodeBuilder::new(SegmentKey::Literal(String::new())),
            registrations: 0,
        }
    }

    /// Sets how conflicting registrations are handled.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compiles `pattern` and registers `value` under `dispatch_key`.
    ///
    /// Fails if the dispatch key is empty, the pattern does not compile, or the builder is
    /// strict and an equivalent registration exists. A failed registration leaves every earlier
    /// one in place.
    pub fn add(&mut self, dispatch_key: &str, pattern: &str, value: T) -> Result<&mut Self> {
        if dispatch_key.is_empty() {
            return Err(Error::InvalidArgument("dispatch key must not be empty"));
        }

        let pattern = Pattern::compile(pattern, &self.options)?;
        let case_sensitive = self.options.case_sensitive;
        let keys: Vec<SegmentKey> = pattern
            .segments()
            .iter()
            .map(|d| SegmentKey::for_descriptor(d, case_sensitive))
            .collect();

        trace!(
            " inserting `{} {}` along {} edges",
            dispatch_key,
            pattern.source(),
            keys.len()
        );

        let mut node = &mut self.root;
        for key in keys {
            node = node.child_or_insert(key);
        }
        node.add_leaf(
            Leaf::new(dispatch_key, value, pattern, self.registrations),
            self.policy,
        )?;

        self.registrations += 1;
        Ok(self)
    }

    /// Freezes the trie. No registration can be added to the result.
    pub fn build(self) -> Resolver<T> {
        debug!(
            " freezing resolver with {} registrations",
            self.registrations
        );

        Resolver {
            options: self.options,
            root: self.root.finalize(),
            registrations: self.registrations,
        }
    }
}

impl<T> Default for ResolverBuilder<T> {
    fn default() -> Self {
        ResolverBuilder::new()
    }
}

/// An immutable trie of registered patterns.
///
/// `Resolver<T>` is `Send + Sync` whenever `T` is, and every method takes `&self`.
#[derive(Debug)]
pub struct Resolver<T> {
    options: PatternOptions,
    root: Node<T>,
    registrations: usize,
}

impl<T> Resolver<T> {
    /// Options the registered patterns were compiled with.
    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Number of successful `add` calls made on the builder.
    pub fn len(&self) -> usize {
        self.registrations
    }

    /// True if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.registrations == 0
    }

    /// Borrow the root `Node`.
    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Reports every registration under `dispatch_key` which matches `path` to `visitor`, in
    /// trie order: literal edges before parameters, parameters before catch-alls, registration
    /// order within a node.
    ///
    /// Finding nothing is not an error. An empty dispatch key is, as is a path segment with an
    /// invalid percent-escape.
    pub fn resolve<'a, F>(&'a self, dispatch_key: &str, path: &str, mut visitor: F) -> Result<()>
    where
        F: FnMut(Match<'a, T>),
    {
        if dispatch_key.is_empty() {
            return Err(Error::InvalidArgument("dispatch key must not be empty"));
        }

        trace!(" resolving `{} {}`", dispatch_key, path);

        let container = PathContainer::parse(path, &self.options)?;
        let segments = container.segment_values();
        let simple = !container
            .elements()
            .windows(2)
            .any(|w| w[0].is_separator() && w[1].is_separator());

        let mut visits: Vec<Visit<'a, T>> = vec![];
        self.root.traverse(
            &segments,
            container.has_trailing_separator(),
            self.options.case_sensitive,
            &mut |visit| visits.push(visit),
        );

        for visit in visits {
            for leaf in visit.node.leaves(dispatch_key) {
                let params = if leaf.is_plain() && simple && !visit.verify {
                    self.bind_plain(leaf, &container, &segments, &visit.params)
                } else {
                    leaf.pattern()
                        .match_and_extract_container(&container)
                        .map(|info| info.into_variables())
                };

                if let Some(params) = params {
                    trace!(" `{} {}` matched", dispatch_key, leaf.pattern().source());
                    visitor(Match {
                        value: leaf.value(),
                        params,
                        dispatch_key: leaf.dispatch_key(),
                        pattern: leaf.pattern(),
                        registration: leaf.registration(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Collects every match `resolve` reports.
    pub fn resolve_all<'a>(&'a self, dispatch_key: &str, path: &str) -> Result<Vec<Match<'a, T>>> {
        let mut matches = vec![];
        self.resolve(dispatch_key, path, |m| matches.push(m))?;
        Ok(matches)
    }

    /// Picks the most specific match for `path`, by `specificity::compare`. Equally specific
    /// matches go to the earliest registration.
    pub fn resolve_best<'a>(&'a self, dispatch_key: &str, path: &str) -> Result<Option<Match<'a, T>>> {
        let mut best: Option<Match<'a, T>> = None;

        self.resolve(dispatch_key, path, |m| {
            best = match best.take() {
                None => Some(m),
                Some(current) => {
                    let order = specificity::compare(Some(m.pattern), Some(current.pattern), path)
                        .then(m.registration.cmp(&current.registration));
                    if order == Ordering::Less {
                        Some(m)
                    } else {
                        Some(current)
                    }
                }
            };
        })?;

        Ok(best)
    }

    // Binds a plain leaf by segment position once its separator layout is confirmed.
    fn bind_plain(
        &self,
        leaf: &Leaf<T>,
        container: &PathContainer,
        segments: &[&str],
        params: &[usize],
    ) -> Option<LinkedHashMap<String, String>> {
        let pattern = leaf.pattern();
        if pattern.has_leading_separator() != container.has_leading_separator() {
            return None;
        }

        let trailing_ok = pattern.has_trailing_separator() == container.has_trailing_separator()
            || (self.options.match_optional_trailing_separator
                && container.has_trailing_separator()
                && !pattern.elements().is_empty());
        if !trailing_ok {
            return None;
        }

        // a segment holding only matrix parameters has no value to capture
        if params.iter().any(|&i| segments[i].is_empty()) {
            return None;
        }

        Some(
            leaf.parameter_names()
                .iter()
                .zip(params)
                .map(|(name, &i)| (name.clone(), segments[i].to_owned()))
                .collect(),
        )
    }
}
