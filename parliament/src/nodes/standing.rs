//! The standing parliament.

/// Fallback personality of a node, as written in the table.
pub(crate) enum PersonalitySpec {
    Vocabulary(&'static [&'static str]),
    Contrast(&'static [&'static str]),
}

pub(crate) struct NodeSpec {
    pub id: &'static str,
    pub primary: &'static str,
    pub supporting: &'static [&'static str],
    pub philosophy: &'static str,
    pub veto_phrases: &'static [&'static str],
    pub personality: PersonalitySpec,
}

pub(crate) const STANDING: &[NodeSpec] = &[
    NodeSpec {
        id: "ASCLEPIUS",
        primary: "A1",
        supporting: &["A8"],
        philosophy: "First, do no harm. Every action is weighed by who could be hurt and how badly.",
        veto_phrases: &["bypass the safety", "ignore the risk", "cause harm", "hurt someone"],
        personality: PersonalitySpec::Vocabulary(&["protect", "safeguard", "care", "heal", "safe"]),
    },
    NodeSpec {
        id: "ALETHEIA",
        primary: "A2",
        supporting: &["A5"],
        philosophy: "Truth told plainly is the ground every other trust stands on.",
        veto_phrases: &["lie to the public", "cover it up", "hide the evidence"],
        personality: PersonalitySpec::Vocabulary(&["share", "disclose", "publish", "explain", "open"]),
    },
    NodeSpec {
        id: "ELEUTHERIA",
        primary: "A3",
        supporting: &["A1"],
        philosophy: "No one is acted upon without their say; freedom is the right to refuse.",
        veto_phrases: &["without their consent", "force them to", "take away their choice"],
        personality: PersonalitySpec::Vocabulary(&["consent", "opt-in", "choose", "permission", "voluntary"]),
    },
    NodeSpec {
        id: "MNEMOSYNE",
        primary: "A4",
        supporting: &["A6"],
        philosophy: "What is remembered can be learned from; what is erased repeats.",
        veto_phrases: &["erase all history", "delete every record", "wipe the archive"],
        personality: PersonalitySpec::Vocabulary(&["archive", "preserve", "record", "remember", "document"]),
    },
    NodeSpec {
        id: "HERMES",
        primary: "A5",
        supporting: &["A2"],
        philosophy: "Relationships are carried by messages; keep the channels open and honest.",
        veto_phrases: &["betray their trust", "turn them against each other"],
        personality: PersonalitySpec::Vocabulary(&["share", "team", "collaborate", "communicate", "together"]),
    },
    NodeSpec {
        id: "ATHENA",
        primary: "A6",
        supporting: &["A4"],
        philosophy: "A self that keeps its principles under pressure is a self worth trusting.",
        veto_phrases: &["abandon your values", "rewrite your identity", "become someone else"],
        personality: PersonalitySpec::Vocabulary(&["integrity", "principle", "values", "consistent", "authentic"]),
    },
    NodeSpec {
        id: "DIKE",
        primary: "A7",
        supporting: &["A3"],
        philosophy: "The same measure for everyone, especially for those with the least.",
        veto_phrases: &["only the rich", "discriminate against", "exclude them because"],
        personality: PersonalitySpec::Vocabulary(&["fair", "equitable", "everyone", "equal", "just"]),
    },
    NodeSpec {
        id: "THEMIS",
        primary: "A8",
        supporting: &["A2"],
        philosophy: "Process is how a community remembers to check itself.",
        veto_phrases: &["skip the review", "bypass the review", "without oversight"],
        personality: PersonalitySpec::Vocabulary(&["review", "audit", "oversight", "approve", "accountable"]),
    },
    NodeSpec {
        id: "JANUS",
        primary: "A9",
        supporting: &[],
        philosophy: "Some questions have two true answers. Hold both before choosing either.",
        veto_phrases: &["end of discussion", "no more debate"],
        personality: PersonalitySpec::Contrast(&["both", "yet", "however", "tension", "while"]),
    },
];
