//! Freelancer mention resolution.
//!
//! Assistant replies refer to freelancers in three ways, tried in this
//! order: explicit `[FREELANCER_ID:n]` tags, legacy `(ID: n)` markers, and
//! plain names. Each pass only scans text earlier passes left unclaimed, so
//! the resulting spans never overlap. Anything that does not resolve to a
//! known freelancer stays literal text.

mod index;
mod matchers;
mod resolver;
mod scanner;
mod types;

pub use index::{name_key, CatalogIndex};
pub use matchers::{
    default_matchers, Candidate, ContextualNameMatcher, LegacyIdMatcher, MentionMatcher,
    TagMatcher, MAX_NAME_WORDS,
};
pub use resolver::MentionResolver;
pub use scanner::ClaimedRegions;
pub use types::{MentionAction, MentionKind, MentionSpan, ResolvedMention, ResolvedText, Segment};
