//! Filler surveys synthesized when the queue runs dry

use rand::seq::SliceRandom;

/// Prompt and options of a filler survey
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerPrompt {
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
}

impl FillerPrompt {
    pub fn new(prompt: &str, option_a: &str, option_b: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            option_a: option_a.to_string(),
            option_b: option_b.to_string(),
        }
    }
}

/// Fixed set of filler prompts, one drawn uniformly at random per use
#[derive(Debug, Clone)]
pub struct FillerDeck {
    prompts: Vec<FillerPrompt>,
}

impl FillerDeck {
    /// Deck with the built-in neighbourhood prompts
    pub fn standard() -> Self {
        Self {
            prompts: vec![
                FillerPrompt::new(
                    "Whose dog is barking at 3 in the morning?",
                    "The only insomniac",
                    "A demon in disguise",
                ),
                FillerPrompt::new(
                    "What do we do about the umpteenth pothole?",
                    "Protect it as heritage",
                    "Plant fake geraniums in it",
                ),
                FillerPrompt::new(
                    "Why does it always smell of fried food on Thursdays?",
                    "Grandma struck again",
                    "The fried aubergine lobby",
                ),
                FillerPrompt::new(
                    "Whose fault is it when it rains on the weekend?",
                    "Whoever washed their car",
                    "The powers that be",
                ),
                FillerPrompt::new(
                    "How was the last neighbourhood meeting?",
                    "A great cure for insomnia",
                    "Worse than a kick in the shins",
                ),
                FillerPrompt::new(
                    "Who stole my favourite pen?",
                    "A stationery smuggler",
                    "It clearly ran away",
                ),
                FillerPrompt::new(
                    "Why does the Wi-Fi drop at the best moment?",
                    "The server hamsters are tired",
                    "Martians are spying on us",
                ),
            ],
        }
    }

    /// Deck with caller-provided prompts; empty input falls back to the standard deck
    pub fn with_prompts(prompts: Vec<FillerPrompt>) -> Self {
        if prompts.is_empty() {
            return Self::standard();
        }
        Self { prompts }
    }

    pub fn prompts(&self) -> &[FillerPrompt] {
        &self.prompts
    }

    /// Draw one prompt uniformly at random
    pub fn draw(&self) -> FillerPrompt {
        let mut rng = rand::thread_rng();
        match self.prompts.choose(&mut rng) {
            Some(prompt) => prompt.clone(),
            None => FillerPrompt::new("Which option do you prefer?", "The first", "The second"),
        }
    }
}

impl Default for FillerDeck {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_comes_from_deck() {
        let deck = FillerDeck::standard();
        for _ in 0..20 {
            let drawn = deck.draw();
            assert!(deck.prompts().contains(&drawn));
        }
    }

    #[test]
    fn test_empty_custom_deck_falls_back() {
        let deck = FillerDeck::with_prompts(Vec::new());
        assert_eq!(deck.prompts().len(), FillerDeck::standard().prompts().len());
    }

    #[test]
    fn test_standard_prompts_fit_bounds() {
        for p in FillerDeck::standard().prompts() {
            assert!((5..=300).contains(&p.prompt.chars().count()));
            assert!((1..=150).contains(&p.option_a.chars().count()));
            assert!((1..=150).contains(&p.option_b.chars().count()));
        }
    }
}
