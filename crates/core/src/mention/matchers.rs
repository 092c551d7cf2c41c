//! The mention passes, in the order they run.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use std::ops::Range;

use super::index::CatalogIndex;
use super::scanner::ClaimedRegions;
use super::types::MentionKind;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[FREELANCER_ID:\s*(\d+)\]").unwrap());

static LEGACY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(ID:\s*(\d+)\)|\bID:\s*(\d+)").unwrap());

/// A run of capitalised words separated by spaces or tabs.
static CAPITALIZED_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z0-9_'-]*(?:[ \t]+[A-Z][A-Za-z0-9_'-]*)*").unwrap()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][A-Za-z0-9_'-]*").unwrap());

static ROLE_NOUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(freelancer|expert|professional|specialist|candidate|provider|worker)s?[ \t]+$",
    )
    .unwrap()
});

/// Longest name, in words, the contextual pass tries.
pub const MAX_NAME_WORDS: usize = 3;

/// A resolvable match found by one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub range: Range<usize>,
    pub freelancer_id: u64,
    pub kind: MentionKind,
}

/// One mention pass.
///
/// Implementations only look at text outside `claimed` and only return
/// candidates whose freelancer exists in `index`.
pub trait MentionMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn find(&self, text: &str, index: &CatalogIndex, claimed: &ClaimedRegions) -> Vec<Candidate>;
}

/// The default pass order: tags, legacy IDs, then names.
pub fn default_matchers() -> Vec<Box<dyn MentionMatcher>> {
    vec![
        Box::new(TagMatcher),
        Box::new(LegacyIdMatcher),
        Box::new(ContextualNameMatcher),
    ]
}

fn parse_id(caps: &Captures<'_>, groups: &[usize]) -> Option<u64> {
    groups
        .iter()
        .find_map(|&group| caps.get(group))
        .and_then(|m| m.as_str().parse().ok())
}

/// Shared body of the ID-pattern passes.
fn find_ids(
    re: &Regex,
    groups: &[usize],
    kind: MentionKind,
    text: &str,
    index: &CatalogIndex,
    claimed: &ClaimedRegions,
) -> Vec<Candidate> {
    let mut found = Vec::new();
    for (offset, gap) in claimed.gaps(text) {
        for caps in re.captures_iter(gap) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(id) = parse_id(&caps, groups) else {
                continue;
            };
            if index.get(id).is_none() {
                continue;
            }
            found.push(Candidate {
                range: offset + whole.start()..offset + whole.end(),
                freelancer_id: id,
                kind: kind.clone(),
            });
        }
    }
    found
}

/// `[FREELANCER_ID:n]`
pub struct TagMatcher;

impl MentionMatcher for TagMatcher {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn find(&self, text: &str, index: &CatalogIndex, claimed: &ClaimedRegions) -> Vec<Candidate> {
        find_ids(&TAG_RE, &[1], MentionKind::Tag, text, index, claimed)
    }
}

/// `(ID: n)`, parentheses included, or a bare `ID: n`.
pub struct LegacyIdMatcher;

impl MentionMatcher for LegacyIdMatcher {
    fn name(&self) -> &'static str {
        "legacy_id"
    }

    fn find(&self, text: &str, index: &CatalogIndex, claimed: &ClaimedRegions) -> Vec<Candidate> {
        find_ids(
            &LEGACY_ID_RE,
            &[1, 2],
            MentionKind::LegacyId,
            text,
            index,
            claimed,
        )
    }
}

/// Capitalised names of up to three words, looked up case-insensitively.
///
/// Within a run of capitalised words the longest known window wins and the
/// scan continues after it. A role noun right before the name ("expert
/// Ada Lovelace") is recorded on the mention but not included in the span.
pub struct ContextualNameMatcher;

impl ContextualNameMatcher {
    fn find_in_run(
        &self,
        gap: &str,
        run: Range<usize>,
        index: &CatalogIndex,
        found: &mut Vec<(Range<usize>, u64, Option<String>)>,
    ) {
        let words: Vec<Range<usize>> = WORD_RE
            .find_iter(&gap[run.clone()])
            .map(|m| run.start + m.start()..run.start + trim_possessive(m.as_str(), m.end()))
            .collect();

        let mut i = 0;
        while i < words.len() {
            let longest = (1..=MAX_NAME_WORDS.min(words.len() - i))
                .rev()
                .find_map(|len| {
                    let span = words[i].start..words[i + len - 1].end;
                    index.find_name(&gap[span.clone()]).map(|entry| (span, entry.id, len))
                });

            match longest {
                Some((span, id, len)) => {
                    let role_noun = role_noun_before(&gap[..span.start]);
                    found.push((span, id, role_noun));
                    i += len;
                }
                None => i += 1,
            }
        }
    }
}

impl MentionMatcher for ContextualNameMatcher {
    fn name(&self) -> &'static str {
        "contextual_name"
    }

    fn find(&self, text: &str, index: &CatalogIndex, claimed: &ClaimedRegions) -> Vec<Candidate> {
        if index.is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for (offset, gap) in claimed.gaps(text) {
            let mut in_gap = Vec::new();
            for run in CAPITALIZED_RUN_RE.find_iter(gap) {
                self.find_in_run(gap, run.range(), index, &mut in_gap);
            }
            found.extend(in_gap.into_iter().map(|(span, id, role_noun)| Candidate {
                range: offset + span.start..offset + span.end,
                freelancer_id: id,
                kind: MentionKind::ContextualName { role_noun },
            }));
        }
        found
    }
}

/// End offset of `word` (ending at `end`) without a trailing `'s` or `'`.
fn trim_possessive(word: &str, end: usize) -> usize {
    if let Some(stem) = word.strip_suffix("'s") {
        if !stem.is_empty() {
            return end - 2;
        }
    }
    if let Some(stem) = word.strip_suffix('\'') {
        if !stem.is_empty() {
            return end - 1;
        }
    }
    end
}

fn role_noun_before(prefix: &str) -> Option<String> {
    ROLE_NOUN_RE
        .find(prefix)
        .map(|m| m.as_str().trim_end().to_lowercase())
}
