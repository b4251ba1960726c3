//! Closure notifications for the people who voted

use async_trait::async_trait;
use pollboard_core::ClosureSummary;
use tracing::info;

/// Receives every forced closure; chat front ends deliver it to `summary.voters`
#[async_trait]
pub trait ClosureNotifier: Send + Sync {
    async fn notify_closure(&self, summary: &ClosureSummary);
}

/// Default notifier: writes the closure to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ClosureNotifier for LogNotifier {
    async fn notify_closure(&self, summary: &ClosureSummary) {
        info!(
            survey_id = %summary.survey_id,
            voters = summary.voters.len(),
            "{}",
            closure_message(summary)
        );
    }
}

/// Plain-text closure announcement
pub fn closure_message(summary: &ClosureSummary) -> String {
    format!(
        "Survey #{} is closed!\n\n{}\nA) {}: {} votes\nB) {}: {} votes\n\nThanks for taking part! A new survey is already live.",
        summary.survey_id,
        summary.prompt,
        summary.option_a,
        summary.tally.a,
        summary.option_b,
        summary.tally.b
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollboard_core::{SurveyId, Tally};

    #[test]
    fn test_message_lists_counts() {
        let summary = ClosureSummary {
            survey_id: SurveyId(12),
            prompt: "Bigger recycling bins?".to_string(),
            option_a: "Yes".to_string(),
            option_b: "No".to_string(),
            tally: Tally { a: 20, b: 10 },
            net_steps: 680,
            voters: vec![1, 2],
        };
        let message = closure_message(&summary);
        assert!(message.starts_with("Survey #12 is closed!"));
        assert!(message.contains("A) Yes: 20 votes"));
        assert!(message.contains("B) No: 10 votes"));
    }
}
