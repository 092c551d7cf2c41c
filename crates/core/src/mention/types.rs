use serde::Serialize;

/// A region of a message replaced by a freelancer reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionSpan {
    /// Byte offset of the first matched byte.
    pub start_offset: usize,
    /// Byte offset one past the last matched byte.
    pub end_offset: usize,
    pub resolved_freelancer_id: u64,
}

/// Which pass found a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MentionKind {
    /// `[FREELANCER_ID:n]`
    Tag,
    /// `(ID: n)` or a bare `ID: n`
    LegacyId,
    /// A known name, possibly after a role noun such as "freelancer".
    ContextualName {
        #[serde(rename = "roleNoun", skip_serializing_if = "Option::is_none")]
        role_noun: Option<String>,
    },
}

impl MentionKind {
    /// Pass name used in metrics.
    pub fn pass(&self) -> &'static str {
        match self {
            MentionKind::Tag => "tag",
            MentionKind::LegacyId => "legacy_id",
            MentionKind::ContextualName { .. } => "contextual_name",
        }
    }
}

/// What a rendered mention lets the user do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MentionAction {
    ViewProfile {
        #[serde(rename = "freelancerId")]
        freelancer_id: u64,
    },
    StartChat {
        #[serde(rename = "freelancerId")]
        freelancer_id: u64,
    },
}

impl MentionAction {
    /// Both affordances for one freelancer.
    pub fn for_freelancer(freelancer_id: u64) -> Vec<MentionAction> {
        vec![
            MentionAction::ViewProfile { freelancer_id },
            MentionAction::StartChat { freelancer_id },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMention {
    pub span: MentionSpan,
    /// The text the span covered.
    pub matched_text: String,
    /// Name to render in place of the matched text.
    pub label: String,
    pub kind: MentionKind,
    pub actions: Vec<MentionAction>,
    /// The freelancer is among the matches returned with the reply.
    pub in_match_list: bool,
}

impl ResolvedMention {
    pub fn freelancer_id(&self) -> u64 {
        self.span.resolved_freelancer_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Literal { text: String },
    Reference(ResolvedMention),
}

/// A message split into literal text and resolved references, in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedText {
    pub segments: Vec<Segment>,
}

impl ResolvedText {
    /// The whole text as one literal segment.
    pub fn literal(text: &str) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Literal {
                text: text.to_string(),
            }]
        };
        Self { segments }
    }

    pub fn mentions(&self) -> impl Iterator<Item = &ResolvedMention> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reference(mention) => Some(mention),
            Segment::Literal { .. } => None,
        })
    }

    pub fn spans(&self) -> Vec<MentionSpan> {
        self.mentions().map(|m| m.span).collect()
    }

    /// Distinct freelancer IDs in order of first appearance.
    pub fn mentioned_freelancers(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = Vec::new();
        for id in self.mentions().map(ResolvedMention::freelancer_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn has_mentions(&self) -> bool {
        self.mentions().next().is_some()
    }

    /// The original text, reassembled.
    pub fn source_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal { text } => text.as_str(),
                Segment::Reference(mention) => mention.matched_text.as_str(),
            })
            .collect()
    }
}
