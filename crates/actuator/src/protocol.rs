//! Wire types for the actuator's HTTP endpoints

use serde::{Deserialize, Serialize};

/// Replace accented vowels with an ASCII letter plus apostrophe
///
/// The device display has no glyphs beyond ASCII.
pub fn sanitize_display_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'à' => out.push_str("a'"),
            'è' | 'é' => out.push_str("e'"),
            'ì' => out.push_str("i'"),
            'ò' => out.push_str("o'"),
            'ù' => out.push_str("u'"),
            'À' => out.push_str("A'"),
            'È' | 'É' => out.push_str("E'"),
            'Ì' => out.push_str("I'"),
            'Ò' => out.push_str("O'"),
            'Ù' => out.push_str("U'"),
            other => out.push(other),
        }
    }
    out
}

/// Display content, already sanitized and labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub question: String,
    pub answer_a: String,
    pub answer_b: String,
}

impl DisplayFrame {
    pub fn new(prompt: &str, option_a: &str, option_b: &str) -> Self {
        Self {
            question: sanitize_display_text(prompt),
            answer_a: format!("1: {}", sanitize_display_text(option_a)),
            answer_b: format!("2: {}", sanitize_display_text(option_b)),
        }
    }

    /// Query parameters for `GET /quiz`
    pub fn query(&self) -> [(&'static str, &str); 3] {
        [
            ("q", self.question.as_str()),
            ("a1", self.answer_a.as_str()),
            ("a2", self.answer_b.as_str()),
        ]
    }
}

/// Votes cast on the device since the previous successful poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalVotes {
    #[serde(rename = "A", default)]
    pub a: u32,
    #[serde(rename = "B", default)]
    pub b: u32,
}

impl PhysicalVotes {
    pub fn is_empty(&self) -> bool {
        self.a == 0 && self.b == 0
    }

    pub fn total(&self) -> u32 {
        self.a.saturating_add(self.b)
    }
}
