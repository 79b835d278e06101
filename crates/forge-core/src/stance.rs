//! Stance Registry: mode string -> persona directive + baseline scores.
//!
//! Three stances (SHOGUN, NINJA, KATANA) selected by the caller's `mode`
//! field. Unknown or empty modes resolve to the professional SHOGUN stance;
//! the registry never fails a lookup. Read-only after compile; directives and
//! baselines are `&'static` data.

use serde::{Deserialize, Serialize};

/// Stance selector. Professional (SHOGUN) is the default for unknown modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    /// High diplomacy: complaints become requests for excellence.
    #[default]
    Professional,
    /// Tactical brevity: two sentences, no greetings, no sign-offs.
    Short,
    /// Aggressive professionalism: patience has reached its limit.
    Vibe,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Professional => "professional",
            Stance::Short => "short",
            Stance::Vibe => "vibe",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            s if s.eq_ignore_ascii_case("short") => Stance::Short,
            s if s.eq_ignore_ascii_case("vibe") => Stance::Vibe,
            _ => Stance::Professional, // default: professional (including empty / unknown)
        }
    }
}

/// Immutable persona: instruction block for the system prompt plus the
/// baseline honor/stealth pair the stance advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub stance: Stance,
    pub directive: &'static str,
    pub honor: i64,
    pub stealth: i64,
}

const SHOGUN: Persona = Persona {
    stance: Stance::Professional,
    directive: "STANCE: SHOGUN. Tone: High Diplomacy. \
        Rule: Use 'Esteemed' or 'Respectfully.' Transform all complaints into requests for excellence. \
        Honor: 95, Stealth: 20.",
    honor: 95,
    stealth: 20,
};

const NINJA: Persona = Persona {
    stance: Stance::Short,
    directive: "STANCE: NINJA. Tone: Tactical Brevity. \
        Rule: Maximum TWO sentences. No greetings. No sign-offs. \
        Structure: Sentence 1 identifies the issue. Sentence 2 gives the order. \
        Honor: 40, Stealth: 98.",
    honor: 40,
    stealth: 98,
};

const KATANA: Persona = Persona {
    stance: Stance::Vibe,
    directive: "STANCE: KATANA. Tone: Aggressive Professionalism. \
        Rule: Use 'As per my previous' or 'I trust this is clear.' \
        Subtext: Your patience has reached its limit. \
        Honor: 10, Stealth: 75.",
    honor: 10,
    stealth: 75,
};

/// Resolve a caller-supplied mode to its persona. Pure lookup, fixed default.
pub fn resolve(mode: &str) -> &'static Persona {
    match Stance::from_str(mode) {
        Stance::Professional => &SHOGUN,
        Stance::Short => &NINJA,
        Stance::Vibe => &KATANA,
    }
}
