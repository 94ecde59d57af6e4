use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::constants::{INITIAL_SNAKE_LENGTH, MAX_NICK_LEN, MAX_SCORE, POINTS_PER_FOOD};

/// Payload handed to the score-submission collaborator after game over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub nick: String,
    pub score: u32,
    pub snake_length: usize,
}

/// A snake only ever grows by eating, so its final length is fully
/// determined by the final score.
pub fn score_matches_length(score: u32, snake_length: usize) -> bool {
    score % POINTS_PER_FOOD == 0
        && snake_length == INITIAL_SNAKE_LENGTH + (score / POINTS_PER_FOOD) as usize
}

/// Rejects submissions whose stats could not have come from a real game.
pub fn validate_submission(submission: &ScoreSubmission) -> Result<()> {
    if submission.nick.len() > MAX_NICK_LEN {
        bail!("nickname must be at most {MAX_NICK_LEN} characters");
    }
    if submission.score > MAX_SCORE {
        bail!("score cannot exceed {MAX_SCORE}");
    }
    if submission.score % POINTS_PER_FOOD != 0 {
        bail!("score must be a multiple of {POINTS_PER_FOOD}");
    }
    if submission.snake_length < INITIAL_SNAKE_LENGTH {
        bail!("snake length must be at least {INITIAL_SNAKE_LENGTH}");
    }
    if !score_matches_length(submission.score, submission.snake_length) {
        bail!(
            "score and snake length do not match; expected length {}",
            INITIAL_SNAKE_LENGTH + (submission.score / POINTS_PER_FOOD) as usize
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(score: u32, snake_length: usize) -> ScoreSubmission {
        ScoreSubmission {
            nick: "player".to_string(),
            score,
            snake_length,
        }
    }

    #[test]
    fn consistent_stats_pass() {
        assert!(validate_submission(&submission(0, 3)).is_ok());
        assert!(validate_submission(&submission(30, 6)).is_ok());
        assert!(validate_submission(&submission(MAX_SCORE, 1003)).is_ok());
    }

    #[test]
    fn length_must_follow_from_score() {
        assert!(validate_submission(&submission(30, 5)).is_err());
        assert!(validate_submission(&submission(30, 7)).is_err());
        assert!(!score_matches_length(10, 3));
        assert!(score_matches_length(10, 4));
    }

    #[test]
    fn score_must_be_a_multiple_of_the_food_value() {
        assert!(validate_submission(&submission(15, 4)).is_err());
        assert!(!score_matches_length(15, 4));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(validate_submission(&submission(MAX_SCORE + 10, 1004)).is_err());
        assert!(validate_submission(&submission(0, 2)).is_err());
        let long_nick = ScoreSubmission {
            nick: "x".repeat(MAX_NICK_LEN + 1),
            score: 0,
            snake_length: 3,
        };
        assert!(validate_submission(&long_nick).is_err());
    }
}
