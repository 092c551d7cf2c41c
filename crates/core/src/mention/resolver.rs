use tracing::{debug, warn};

use super::index::CatalogIndex;
use super::matchers::{default_matchers, Candidate, MentionMatcher};
use super::scanner::ClaimedRegions;
use super::types::{MentionAction, MentionSpan, ResolvedMention, ResolvedText, Segment};
use crate::catalog::{CachedCatalog, CatalogEntry, FreelancerRecord};
use crate::metrics::{MENTIONS_RESOLVED, MENTION_RESOLUTION_DEGRADED};

/// Finds freelancer references in assistant text.
///
/// Stateless: the same text and catalog always give the same result.
pub struct MentionResolver {
    matchers: Vec<Box<dyn MentionMatcher>>,
}

impl Default for MentionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionResolver {
    /// Resolver with the standard passes: tags, legacy IDs, names.
    pub fn new() -> Self {
        Self::with_matchers(default_matchers())
    }

    /// Resolver running `matchers` in the given order.
    pub fn with_matchers(matchers: Vec<Box<dyn MentionMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Resolve `text` against `catalog` reconciled with the reply's `matches`.
    pub fn resolve(
        &self,
        text: &str,
        catalog: &[CatalogEntry],
        matches: &[FreelancerRecord],
    ) -> ResolvedText {
        self.resolve_with_index(text, &CatalogIndex::new(catalog, matches))
    }

    pub fn resolve_with_index(&self, text: &str, index: &CatalogIndex) -> ResolvedText {
        let mut claimed = ClaimedRegions::new();
        let mut accepted: Vec<Candidate> = Vec::new();

        for matcher in &self.matchers {
            for candidate in matcher.find(text, index, &claimed) {
                if claimed.claim(candidate.range.clone()) {
                    MENTIONS_RESOLVED
                        .with_label_values(&[candidate.kind.pass()])
                        .inc();
                    accepted.push(candidate);
                }
            }
        }

        accepted.sort_by_key(|c| c.range.start);
        debug!("Resolved {} mentions", accepted.len());

        let mut segments = Vec::with_capacity(accepted.len() * 2 + 1);
        let mut cursor = 0;
        for candidate in accepted {
            if candidate.range.start > cursor {
                segments.push(Segment::Literal {
                    text: text[cursor..candidate.range.start].to_string(),
                });
            }
            cursor = candidate.range.end;
            segments.push(Segment::Reference(build_mention(text, candidate, index)));
        }
        if cursor < text.len() {
            segments.push(Segment::Literal {
                text: text[cursor..].to_string(),
            });
        }

        ResolvedText { segments }
    }

    /// Load the catalog and resolve. Any load failure leaves the text
    /// untouched as a single literal segment.
    pub async fn resolve_with_source(
        &self,
        text: &str,
        catalog: &CachedCatalog,
        matches: &[FreelancerRecord],
    ) -> ResolvedText {
        match catalog.entries().await {
            Ok(entries) => self.resolve(text, &entries, matches),
            Err(e) => {
                warn!("Mention resolution skipped, catalog unavailable: {}", e);
                MENTION_RESOLUTION_DEGRADED.inc();
                ResolvedText::literal(text)
            }
        }
    }
}

fn build_mention(text: &str, candidate: Candidate, index: &CatalogIndex) -> ResolvedMention {
    let id = candidate.freelancer_id;
    let label = index
        .get(id)
        .map(CatalogEntry::label)
        .unwrap_or_else(|| format!("Freelancer #{}", id));

    ResolvedMention {
        span: MentionSpan {
            start_offset: candidate.range.start,
            end_offset: candidate.range.end,
            resolved_freelancer_id: id,
        },
        matched_text: text[candidate.range].to_string(),
        label,
        kind: candidate.kind,
        actions: MentionAction::for_freelancer(id),
        in_match_list: index.in_match_list(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::MentionKind;
    use crate::testing::{fixtures, MockFreelancerCatalog};
    use std::sync::Arc;
    use std::time::Duration;

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(42, Some("Ada Lovelace"), Some("ada")),
            CatalogEntry::new(12, Some("Grace Hopper"), None),
            CatalogEntry::new(123, Some("Linus Torvalds"), None),
        ]
    }

    #[test]
    fn test_tag_resolves_to_single_span() {
        let text = "Try [FREELANCER_ID:42] for this.";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);

        assert_eq!(resolved.segments.len(), 3);
        assert_eq!(
            resolved.segments[0],
            Segment::Literal {
                text: "Try ".to_string()
            }
        );
        let Segment::Reference(mention) = &resolved.segments[1] else {
            panic!("expected a reference");
        };
        assert_eq!(mention.matched_text, "[FREELANCER_ID:42]");
        assert_eq!(mention.label, "Ada Lovelace");
        assert_eq!(mention.kind, MentionKind::Tag);
        assert_eq!(
            mention.actions,
            vec![
                MentionAction::ViewProfile { freelancer_id: 42 },
                MentionAction::StartChat { freelancer_id: 42 },
            ]
        );
        assert_eq!(
            resolved.segments[2],
            Segment::Literal {
                text: " for this.".to_string()
            }
        );
        assert_eq!(
            resolved.spans(),
            vec![MentionSpan {
                start_offset: 4,
                end_offset: 22,
                resolved_freelancer_id: 42,
            }]
        );
    }

    #[test]
    fn test_tag_wins_over_legacy_on_same_text() {
        let text = "[FREELANCER_ID:42] (ID: 42)";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);
        let kinds: Vec<MentionKind> = resolved.mentions().map(|m| m.kind.clone()).collect();
        assert_eq!(kinds, vec![MentionKind::Tag, MentionKind::LegacyId]);

        // A tag containing a legacy-looking fragment is claimed once.
        let text = "[FREELANCER_ID:12]";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);
        assert_eq!(resolved.spans().len(), 1);
        assert_eq!(resolved.mentions().next().unwrap().kind, MentionKind::Tag);
    }

    #[test]
    fn test_names_do_not_rematch_tagged_text() {
        let text = "Ada Lovelace [FREELANCER_ID:42]";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);
        let mentions: Vec<_> = resolved.mentions().collect();
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].kind, MentionKind::ContextualName { role_noun: None });
        assert_eq!(mentions[1].kind, MentionKind::Tag);
        assert_eq!(resolved.mentioned_freelancers(), vec![42]);
    }

    #[test]
    fn test_unknown_ids_stay_literal() {
        let text = "See [FREELANCER_ID:999] or (ID: 1000).";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);
        assert_eq!(resolved, ResolvedText::literal(text));
    }

    #[test]
    fn test_spans_are_ordered_and_disjoint() {
        let text = "Linus Torvalds (ID: 123), then [FREELANCER_ID:12] and ID: 42 and Grace Hopper";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &[]);

        let spans = resolved.spans();
        assert_eq!(spans.len(), 5);
        for pair in spans.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }
        assert_eq!(resolved.mentioned_freelancers(), vec![123, 12, 42]);
        assert_eq!(resolved.source_text(), text);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let text = "Ask expert Ada about [FREELANCER_ID:12] and ID: 123.";
        let resolver = MentionResolver::new();
        let first = resolver.resolve(text, &catalog(), &[]);
        let second = resolver.resolve(text, &catalog(), &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_list_reconciliation() {
        let matches = vec![
            fixtures::freelancer(12, Some("Grace Hopper")),
            fixtures::freelancer(500, Some("Margaret Hamilton")),
        ];
        let text = "Grace Hopper, Margaret Hamilton and Ada Lovelace";
        let resolved = MentionResolver::new().resolve(text, &catalog(), &matches);

        let flags: Vec<(u64, bool)> = resolved
            .mentions()
            .map(|m| (m.freelancer_id(), m.in_match_list))
            .collect();
        assert_eq!(flags, vec![(12, true), (500, true), (42, false)]);
    }

    #[test]
    fn test_metric_label_follows_mention_kind() {
        use crate::mention::LegacyIdMatcher;

        // A legacy-only resolver still reports under the pass that found it.
        let resolver = MentionResolver::with_matchers(vec![Box::new(LegacyIdMatcher)]);
        let before = MENTIONS_RESOLVED.with_label_values(&["legacy_id"]).get();
        resolver.resolve("Try (ID: 42).", &catalog(), &[]);
        assert!(MENTIONS_RESOLVED.with_label_values(&["legacy_id"]).get() > before);
    }

    #[test]
    fn test_custom_pass_order() {
        use crate::mention::{LegacyIdMatcher, TagMatcher};

        let resolver =
            MentionResolver::with_matchers(vec![Box::new(LegacyIdMatcher), Box::new(TagMatcher)]);
        assert_eq!(resolver.pass_names(), vec!["legacy_id", "tag"]);

        let resolved = resolver.resolve("[FREELANCER_ID:42]", &catalog(), &[]);
        assert_eq!(resolved.mentions().next().unwrap().kind, MentionKind::Tag);
    }

    #[tokio::test]
    async fn test_catalog_failure_returns_text_unchanged() {
        let source = Arc::new(MockFreelancerCatalog::new());
        source.set_freelancers(vec![fixtures::freelancer(42, Some("Ada"))]).await;
        source.fail_users("user service down").await;
        let cached = CachedCatalog::new(source, Duration::from_secs(60));

        let text = "Try [FREELANCER_ID:42].";
        let resolved = MentionResolver::new()
            .resolve_with_source(text, &cached, &[])
            .await;
        assert_eq!(resolved, ResolvedText::literal(text));
    }

    #[tokio::test]
    async fn test_resolve_with_source_uses_user_names() {
        let source = Arc::new(MockFreelancerCatalog::new());
        let mut record = fixtures::freelancer(8, None);
        record.user_id = Some(80);
        source.set_freelancers(vec![record]).await;
        source
            .set_users(vec![fixtures::user(80, "kat", "Katherine", "Johnson")])
            .await;
        let cached = CachedCatalog::new(source, Duration::from_secs(60));

        let resolved = MentionResolver::new()
            .resolve_with_source("Katherine Johnson can start Monday", &cached, &[])
            .await;
        assert_eq!(resolved.mentioned_freelancers(), vec![8]);
    }

    #[tokio::test]
    async fn test_catalog_row_with_null_skills_resolves_by_name() {
        use crate::catalog::normalize_results;
        use serde_json::json;

        let rows = normalize_results(&[
            json!({ "id": 5, "displayName": "Grace Hopper", "skills": null }),
            json!({ "id": 6, "displayName": "Alan Turing", "location": 12 }),
        ]);
        assert_eq!(rows.len(), 2);

        let source = Arc::new(MockFreelancerCatalog::new());
        source.set_freelancers(rows).await;
        let cached = CachedCatalog::new(source, Duration::from_secs(60));

        let resolved = MentionResolver::new()
            .resolve_with_source("Ask Grace Hopper or Alan Turing", &cached, &[])
            .await;
        let mention = resolved.mentions().next().unwrap();
        assert_eq!(mention.kind, MentionKind::ContextualName { role_noun: None });
        assert_eq!(resolved.mentioned_freelancers(), vec![5, 6]);
    }
}
