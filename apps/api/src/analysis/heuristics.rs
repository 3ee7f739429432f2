//! Fast regex heuristics over a raw transcript.
//!
//! These produce a complete `Analysis` on their own; the analyzer only asks
//! the LLM to refine them. Everything here is pure and deterministic.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

use crate::analysis::analyzer::{Hook, Reasons, Stage, Structure};

/// The opening considered for hook detection, in characters.
const HOOK_WINDOW_CHARS: usize = 240;
/// The opening considered for reason bullets, in characters.
const REASON_WINDOW_CHARS: usize = 200;
/// Pieces of the transcript that make up the hook opening.
const HOOK_PIECES: usize = 3;
/// Only the first sentences are segmented.
const MAX_SENTENCES: usize = 20;

static HOOK_CUES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)stop scrolling",
        r"(?i)wait",
        r"(?i)don'?t",
        r"(?i)here'?s why",
        r"(?i)the secret",
        r"(?i)nobody",
        r"(?i)you need to",
        r"(?i)3 (?:ways|tips|reasons)",
        r"(?i)what if",
    ])
    .expect("valid hook cue patterns")
});

static OPENING_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n|\.\s+").expect("valid regex"));
static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));
static CTA_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(sign up|link in bio|follow|download|try|book|call|visit)")
        .expect("valid regex")
});
static YOU_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?-u:\b)you(?-u:\b)").expect("valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("valid regex"));

/// Coarse hook label assigned by the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PatternInterrupt,
    CuriosityGap,
    Listicle,
    DirectPromise,
}

impl HookKind {
    pub fn label(&self) -> &'static str {
        match self {
            HookKind::PatternInterrupt => "Pattern interrupt",
            HookKind::CuriosityGap => "Curiosity gap",
            HookKind::Listicle => "Listicle",
            HookKind::DirectPromise => "Direct promise",
        }
    }
}

fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The first three lines/sentences, joined, capped at 240 characters.
pub fn hook_opening(transcript: &str) -> String {
    let joined = OPENING_SPLIT
        .split(transcript)
        .take(HOOK_PIECES)
        .collect::<Vec<_>>()
        .join(" ");
    take_chars(&joined, HOOK_WINDOW_CHARS).to_string()
}

/// Pattern interrupt cues win over a question, which wins over numbers.
pub fn classify_hook(opening: &str) -> HookKind {
    if HOOK_CUES.is_match(opening) {
        HookKind::PatternInterrupt
    } else if opening.contains('?') {
        HookKind::CuriosityGap
    } else if DIGIT.is_match(opening) {
        HookKind::Listicle
    } else {
        HookKind::DirectPromise
    }
}

pub fn detect_hooks(transcript: &str) -> Vec<Hook> {
    let opening = hook_opening(transcript);
    vec![Hook {
        hook_type: classify_hook(&opening).label().to_string(),
        line: Some(opening.trim().to_string()),
    }]
}

/// Fixed four-stage skeleton; the last stage is a CTA only when the closing
/// sentences ask the viewer to act.
pub fn segment_structure(transcript: &str) -> Structure {
    let sentences: Vec<&str> = SENTENCE_SPLIT
        .split(transcript)
        .take(MAX_SENTENCES)
        .collect();
    let tail = sentences[sentences.len().saturating_sub(2)..].join(" ");
    let closing = if CTA_CUE.is_match(&tail) { "CTA" } else { "Payoff" };

    let stage = |name: &str, t: f64| Stage {
        name: name.to_string(),
        t: Some(t),
    };
    Structure {
        stages: vec![
            stage("Hook", 0.0),
            stage("Setup", 3.0),
            stage("Proof", 7.0),
            stage(closing, 15.0),
        ],
    }
}

pub fn heuristic_reasons(transcript: &str) -> Reasons {
    let opening = take_chars(transcript, REASON_WINDOW_CHARS);
    let mut bullets = Vec::new();

    if YOU_WORD.is_match(opening) {
        bullets.push("Direct address to viewer in first line".to_string());
    }
    if DIGIT.is_match(opening) {
        bullets.push("Specific numbers create concrete expectation".to_string());
    }
    if opening.contains('?') {
        bullets.push("Curiosity question early to open a loop".to_string());
    }
    if bullets.is_empty() {
        bullets.push("Clear, concise hook within first 3–5 seconds".to_string());
    }

    Reasons {
        bullets,
        evidence: vec![opening.trim().to_string()],
    }
}
