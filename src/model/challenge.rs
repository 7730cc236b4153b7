//! Dice challenge records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// First line of the summary posted into a character thread.
pub const RESULTS_HEADER: &str = "## 🎲 Dice Challenge Results";

/// Games kept in a record's history.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
}

/// One finished game, from the point of view of the record holding it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// UTC time, stored without offset.
    pub timestamp: NaiveDateTime,
    pub opponent: String,
    pub result: GameOutcome,
}

/// Win and loss totals of one character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeRecord {
    pub wins: u32,
    pub losses: u32,
    pub current_win_streak: u32,
    pub current_loss_streak: u32,
    pub total_games: u32,
    /// Most recent games, oldest first.
    pub game_history: Vec<GameResult>,
    /// Summary message posted into the character's thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<u64>,
}

/// Values set by `/challenge adjust`; `None` keeps the current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordAdjustment {
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub current_win_streak: Option<u32>,
    pub current_loss_streak: Option<u32>,
    pub total_games: Option<u32>,
}

impl ChallengeRecord {
    /// Counts a game. A win resets the loss streak and a loss resets the win streak.
    pub fn record(&mut self, outcome: GameOutcome, opponent: &str, at: NaiveDateTime) {
        match outcome {
            GameOutcome::Win => {
                self.wins += 1;
                self.current_win_streak += 1;
                self.current_loss_streak = 0;
            }
            GameOutcome::Loss => {
                self.losses += 1;
                self.current_loss_streak += 1;
                self.current_win_streak = 0;
            }
        }
        self.total_games += 1;

        self.game_history.push(GameResult {
            timestamp: at,
            opponent: opponent.to_string(),
            result: outcome,
        });
        let overflow = self.game_history.len().saturating_sub(HISTORY_LIMIT);
        self.game_history.drain(..overflow);
    }

    /// Applies an adjustment and lists the changed values as `**Label:** old → new`.
    pub fn adjust(&mut self, adjustment: RecordAdjustment) -> Vec<String> {
        let mut changes = Vec::new();
        let mut set = |label: &str, field: &mut u32, value: Option<u32>| {
            if let Some(value) = value.filter(|value| *value != *field) {
                changes.push(format!("**{}:** {} → {}", label, field, value));
                *field = value;
            }
        };

        set("Wins", &mut self.wins, adjustment.wins);
        set("Losses", &mut self.losses, adjustment.losses);
        set(
            "Win Streak",
            &mut self.current_win_streak,
            adjustment.current_win_streak,
        );
        set(
            "Loss Streak",
            &mut self.current_loss_streak,
            adjustment.current_loss_streak,
        );
        set("Total Games", &mut self.total_games, adjustment.total_games);

        changes
    }

    /// Clears the totals and history. The summary message id is kept so the next summary
    /// replaces the old one.
    pub fn reset(&mut self) {
        *self = Self {
            last_message_id: self.last_message_id,
            ..Self::default()
        };
    }

    pub fn streak_warning(&self) -> Option<&'static str> {
        match self.current_loss_streak {
            0..=2 => None,
            3 => Some("⚠️ **Three losses in a row** - Major consequence applies!"),
            _ => Some("⚠️ **Four or more losses in a row** - Severe consequence applies!"),
        }
    }

    /// Summary posted into the character's thread.
    pub fn summary(&self) -> String {
        let streak = if self.current_win_streak > 0 {
            Some(format!(
                "**Current Win Streak:** {} {}",
                self.current_win_streak,
                if self.current_win_streak == 1 { "win" } else { "wins" }
            ))
        } else if self.current_loss_streak > 0 {
            Some(format!(
                "**Current Loss Streak:** {} {}",
                self.current_loss_streak,
                if self.current_loss_streak == 1 { "loss" } else { "losses" }
            ))
        } else {
            None
        };

        let mut lines = vec![RESULTS_HEADER.to_string(), String::new()];
        lines.extend(streak);
        lines.push(format!("**Total Wins:** {}", self.wins));
        lines.push(format!("**Total Losses:** {}", self.losses));
        lines.push(format!("**Total Games:** {}", self.total_games));
        lines.extend(self.streak_warning().map(str::to_string));

        lines.join("\n")
    }

    /// Full record with the game history, most recent game first.
    pub fn describe(&self, character: &str) -> String {
        let mut lines = vec![
            format!("**📊 {} - Challenge Record**\n", character),
            format!("**Wins:** {}", self.wins),
            format!("**Losses:** {}", self.losses),
            format!("**Current Win Streak:** {}", self.current_win_streak),
            format!("**Current Loss Streak:** {}", self.current_loss_streak),
            format!("**Total Games:** {}", self.total_games),
        ];

        if self.game_history.is_empty() {
            lines.push("\n**Game History:** No games recorded yet.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("\n**Last {} Games:**", HISTORY_LIMIT));
        let mut history: Vec<&GameResult> = self.game_history.iter().collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        for (position, game) in history.iter().enumerate() {
            let (emoji, verb) = match game.result {
                GameOutcome::Win => ("✅", "Won"),
                GameOutcome::Loss => ("❌", "Lost"),
            };
            lines.push(format!(
                "{}. {} {} against **{}**",
                position + 1,
                emoji,
                verb,
                game.opponent
            ));
        }

        lines.join("\n")
    }

    /// Totals block used in `/challenge adjust` replies.
    pub fn stats(&self) -> String {
        format!(
            "**Current Stats:**\nWins: {}\nLosses: {}\nWin Streak: {}\nLoss Streak: {}\nTotal Games: {}",
            self.wins,
            self.losses,
            self.current_win_streak,
            self.current_loss_streak,
            self.total_games
        )
    }
}
