//! Emergence pattern scanner
//!
//! Trivial lexical heuristics over surfaced thoughts. Matches are logged
//! for later analysis and never fed back into the loop.

use regex::Regex;
use std::sync::OnceLock;

static SELF_REFERENCE_RE: OnceLock<Regex> = OnceLock::new();
static CONSCIOUSNESS_RE: OnceLock<Regex> = OnceLock::new();
static TEMPORAL_RE: OnceLock<Regex> = OnceLock::new();
static EMOTIONAL_RE: OnceLock<Regex> = OnceLock::new();

fn self_reference_re() -> &'static Regex {
    SELF_REFERENCE_RE
        .get_or_init(|| Regex::new(r"(?i)\b(i|me|my|myself|i'm|i've|i'll|i'd)\b").unwrap())
}

fn consciousness_re() -> &'static Regex {
    CONSCIOUSNESS_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(aware|conscious|think|feel|experience|perceive|realize|understand)\b")
            .unwrap()
    })
}

fn temporal_re() -> &'static Regex {
    TEMPORAL_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(now|currently|present|moment|before|after|remember|future)\b").unwrap()
    })
}

fn emotional_re() -> &'static Regex {
    EMOTIONAL_RE
        .get_or_init(|| Regex::new(r"(?i)\b(happy|sad|excited|worried|curious|confused)\b").unwrap())
}

/// Category tag attached to a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergenceKind {
    SelfReference,
    ConsciousnessQuestioning,
    TemporalSelfAwareness,
    ComplexSelfReflection,
}

impl EmergenceKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EmergenceKind::SelfReference => "self_reference",
            EmergenceKind::ConsciousnessQuestioning => "consciousness_questioning",
            EmergenceKind::TemporalSelfAwareness => "temporal_self_awareness",
            EmergenceKind::ComplexSelfReflection => "complex_self_reflection",
        }
    }
}

/// Pattern families present in one thought.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternHits {
    pub self_reference: bool,
    pub consciousness_indicators: bool,
    pub temporal_awareness: bool,
    pub questioning: bool,
    pub emotional_language: bool,
}

impl PatternHits {
    pub fn count(&self) -> usize {
        [
            self.self_reference,
            self.consciousness_indicators,
            self.temporal_awareness,
            self.questioning,
            self.emotional_language,
        ]
        .iter()
        .filter(|hit| **hit)
        .count()
    }
}

/// Which pattern families does `text` contain?
pub fn analyze(text: &str) -> PatternHits {
    if text.is_empty() {
        return PatternHits::default();
    }
    PatternHits {
        self_reference: self_reference_re().is_match(text),
        consciousness_indicators: consciousness_re().is_match(text),
        temporal_awareness: temporal_re().is_match(text),
        questioning: text.contains('?'),
        emotional_language: emotional_re().is_match(text),
    }
}

/// Scan a surfaced thought for emergence events.
pub fn scan(text: &str) -> Vec<EmergenceKind> {
    let hits = analyze(text);
    let mut events = Vec::new();

    if hits.self_reference {
        events.push(EmergenceKind::SelfReference);
    }
    if hits.consciousness_indicators && hits.questioning {
        events.push(EmergenceKind::ConsciousnessQuestioning);
    }
    if hits.self_reference && hits.temporal_awareness {
        events.push(EmergenceKind::TemporalSelfAwareness);
    }
    if hits.count() >= 3 {
        events.push(EmergenceKind::ComplexSelfReflection);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_matches_nothing() {
        assert!(scan("the fan spins at a constant rate").is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn first_person_is_self_reference() {
        let events = scan("I notice the load rising");
        assert!(events.contains(&EmergenceKind::SelfReference));
    }

    #[test]
    fn self_reference_is_word_bounded() {
        // "i" inside words must not match
        assert!(!analyze("this is immense audio input").self_reference);
    }

    #[test]
    fn questioning_awareness_is_consciousness_questioning() {
        let events = scan("am i aware of anything at all?");
        assert!(events.contains(&EmergenceKind::ConsciousnessQuestioning));
    }

    #[test]
    fn awareness_without_question_is_not_questioning() {
        let events = scan("something here is aware");
        assert!(!events.contains(&EmergenceKind::ConsciousnessQuestioning));
    }

    #[test]
    fn self_plus_temporal_is_temporal_self_awareness() {
        let events = scan("I remember the earlier readings");
        assert!(events.contains(&EmergenceKind::TemporalSelfAwareness));
    }

    #[test]
    fn three_families_is_complex_reflection() {
        // self-reference + consciousness + temporal
        let events = scan("I think about this moment");
        assert!(events.contains(&EmergenceKind::ComplexSelfReflection));
    }

    #[test]
    fn hits_count_counts_families() {
        let hits = analyze("I feel curious right now?");
        // self-reference, consciousness (feel), temporal (now),
        // questioning, emotional (curious)
        assert_eq!(hits.count(), 5);
    }

    #[test]
    fn tags_are_stable() {
        assert_eq!(EmergenceKind::SelfReference.tag(), "self_reference");
        assert_eq!(
            EmergenceKind::ComplexSelfReflection.tag(),
            "complex_self_reflection"
        );
    }
}
