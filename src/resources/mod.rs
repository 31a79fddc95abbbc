//! Idempotent per-module primitives: source checkouts and link chains.
pub mod helpers;
pub mod module_link;
pub mod source;

/// Observed link topology of one module.
///
/// # Examples
///
/// ```
/// use mdlink::resources::LinkState;
///
/// let linked = LinkState::Linked;
/// let partial = LinkState::Partial { detail: "global entry missing".into() };
///
/// assert_ne!(linked, LinkState::Unlinked);
/// assert!(matches!(partial, LinkState::Partial { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Neither the project entry nor the global entry is a symlink.
    Unlinked,
    /// `local -> global -> source` is in place.
    Linked,
    /// Some but not all of the chain is in place.
    Partial {
        /// What is out of place.
        detail: String,
    },
}

/// Result of applying a link or unlink step.
///
/// # Examples
///
/// ```
/// use mdlink::resources::LinkChange;
///
/// let applied = LinkChange::Applied;
/// let noop = LinkChange::AlreadyCorrect;
///
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChange {
    /// The filesystem was changed (or would be, in a dry run).
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
}
