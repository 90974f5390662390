use quickvote_errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
    /// Option index (as a string key) to vote count.
    pub votes: BTreeMap<String, u32>,
    /// User id to the option index that user last selected.
    pub voters: BTreeMap<String, usize>,
    #[serde(default = "default_category")]
    pub category: String,
    pub user_id: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Owner-indexed pointer kept next to every poll (`users/{uid}/polls/{pollId}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollPointer {
    pub poll_id: String,
    pub category: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// What the poll-creation form submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollDraft {
    pub title: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A draft that passed validation; the store turns it into a [`Poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub title: String,
    pub options: Vec<String>,
    pub category: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VotePlan {
    /// First vote by this user.
    Record { choice: usize },
    /// Same option as before; nothing to write.
    Unchanged { choice: usize },
    /// Move the user's vote, decrementing `from` and incrementing `to` in one write.
    Switch { from: usize, to: usize },
}

impl VotePlan {
    pub fn writes(&self) -> bool {
        !matches!(self, VotePlan::Unchanged { .. })
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => default_category(),
    }
}

impl PollDraft {
    /// Checks the draft before anything touches the store.
    pub fn validate(self, user_id: &str) -> Result<NewPoll, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("Please enter a poll question"));
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if options.len() < MIN_OPTIONS {
            return Err(AppError::validation("Please provide at least 2 options"));
        }
        if options.len() > MAX_OPTIONS {
            return Err(AppError::validation("A poll can have at most 6 options"));
        }

        Ok(NewPoll {
            title,
            options,
            category: normalize_category(self.category.as_deref()),
            user_id: user_id.to_string(),
        })
    }
}

impl NewPoll {
    pub fn into_poll(
        self,
        id: String,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Poll {
        let votes = (0..self.options.len()).map(|i| (i.to_string(), 0)).collect();
        Poll {
            id,
            title: self.title,
            options: self.options,
            votes,
            voters: BTreeMap::new(),
            category: self.category,
            user_id: self.user_id,
            created_at: Some(created_at),
        }
    }
}

impl Poll {
    pub fn vote_count(&self, index: usize) -> u32 {
        self.votes.get(&index.to_string()).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> u32 {
        self.votes.values().sum()
    }

    pub fn choice_of(&self, user_id: &str) -> Option<usize> {
        self.voters.get(user_id).copied()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn pointer(&self) -> PollPointer {
        PollPointer {
            poll_id: self.id.clone(),
            category: self.category.clone(),
            created_at: self.created_at,
        }
    }

    /// Decides what casting `choice` for `voter` would change.
    pub fn plan_vote(&self, voter: &str, choice: usize) -> Result<VotePlan, AppError> {
        if choice >= self.options.len() {
            return Err(AppError::validation("That option does not exist"));
        }

        let plan = match self.choice_of(voter) {
            None => VotePlan::Record { choice },
            Some(prev) if prev == choice => VotePlan::Unchanged { choice },
            Some(prev) => VotePlan::Switch { from: prev, to: choice },
        };
        Ok(plan)
    }

    /// Applies a plan produced by [`Poll::plan_vote`] for the same voter.
    /// All fields change together, so a reader never sees a half-applied switch.
    pub fn apply_vote(&mut self, voter: &str, plan: VotePlan) {
        match plan {
            VotePlan::Unchanged { .. } => {}
            VotePlan::Record { choice } => {
                *self.votes.entry(choice.to_string()).or_insert(0) += 1;
                self.voters.insert(voter.to_string(), choice);
            }
            VotePlan::Switch { from, to } => {
                let prev = self.votes.entry(from.to_string()).or_insert(0);
                *prev = prev.saturating_sub(1);
                *self.votes.entry(to.to_string()).or_insert(0) += 1;
                self.voters.insert(voter.to_string(), to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_poll() -> Poll {
        NewPoll {
            title: "Best language?".to_string(),
            options: vec!["Rust".to_string(), "Go".to_string(), "Zig".to_string()],
            category: "Technology".to_string(),
            user_id: "owner".to_string(),
        }
        .into_poll("poll-1".to_string(), chrono::Utc::now())
    }

    fn cast(poll: &mut Poll, voter: &str, choice: usize) -> VotePlan {
        let plan = poll.plan_vote(voter, choice).unwrap();
        poll.apply_vote(voter, plan);
        plan
    }

    #[test]
    fn test_new_poll_starts_zeroed() {
        let poll = sample_poll();
        assert_eq!(poll.votes.len(), poll.options.len());
        assert!(poll.votes.values().all(|v| *v == 0));
        assert!(poll.voters.is_empty());
    }

    #[test]
    fn test_first_vote_records() {
        let mut poll = sample_poll();
        let plan = cast(&mut poll, "alice", 1);
        assert_eq!(plan, VotePlan::Record { choice: 1 });
        assert_eq!(poll.vote_count(1), 1);
        assert_eq!(poll.choice_of("alice"), Some(1));
    }

    #[test]
    fn test_same_option_again_is_noop() {
        let mut poll = sample_poll();
        cast(&mut poll, "alice", 0);
        let before = poll.clone();

        let plan = cast(&mut poll, "alice", 0);
        assert_eq!(plan, VotePlan::Unchanged { choice: 0 });
        assert!(!plan.writes());
        assert_eq!(poll, before);
    }

    #[test]
    fn test_switch_moves_one_vote() {
        let mut poll = sample_poll();
        cast(&mut poll, "alice", 0);
        cast(&mut poll, "bob", 0);
        let total_before = poll.total_votes();

        let plan = cast(&mut poll, "alice", 2);
        assert_eq!(plan, VotePlan::Switch { from: 0, to: 2 });
        assert_eq!(poll.vote_count(0), 1);
        assert_eq!(poll.vote_count(2), 1);
        assert_eq!(poll.choice_of("alice"), Some(2));
        assert_eq!(poll.total_votes(), total_before);
    }

    #[test]
    fn test_sum_matches_distinct_voters_over_a_sequence() {
        let mut poll = sample_poll();
        let sequence = [
            ("a", 0),
            ("b", 1),
            ("a", 1),
            ("c", 2),
            ("b", 1),
            ("a", 0),
            ("d", 0),
            ("c", 0),
        ];
        for (voter, choice) in sequence {
            cast(&mut poll, voter, choice);
            assert_eq!(poll.total_votes() as usize, poll.voters.len());
            for choice in poll.voters.values() {
                assert!(poll.votes.contains_key(&choice.to_string()));
            }
        }
        assert_eq!(poll.voters.len(), 4);
        assert_eq!(poll.vote_count(0), 3);
    }

    #[test]
    fn test_out_of_range_choice_rejected() {
        let poll = sample_poll();
        assert!(matches!(poll.plan_vote("alice", 3), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_draft_with_one_option_rejected() {
        let draft = PollDraft {
            title: "Pick one".to_string(),
            options: vec!["Only".to_string(), "   ".to_string(), String::new()],
            category: None,
        };
        let err = draft.validate("owner").unwrap_err();
        assert_eq!(err, AppError::validation("Please provide at least 2 options"));
    }

    #[test]
    fn test_draft_rejects_empty_title_and_too_many_options() {
        let draft = PollDraft {
            title: "  ".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            category: None,
        };
        assert!(draft.validate("owner").is_err());

        let draft = PollDraft {
            title: "Many".to_string(),
            options: (0..7).map(|i| format!("opt {i}")).collect(),
            category: None,
        };
        assert!(draft.validate("owner").is_err());
    }

    #[test]
    fn test_draft_defaults_category_and_trims() {
        let draft = PollDraft {
            title: "  Tea or coffee? ".to_string(),
            options: vec![" Tea ".to_string(), "".to_string(), "Coffee".to_string()],
            category: Some("   ".to_string()),
        };
        let new_poll = draft.validate("owner").unwrap();
        assert_eq!(new_poll.title, "Tea or coffee?");
        assert_eq!(new_poll.options, vec!["Tea", "Coffee"]);
        assert_eq!(new_poll.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_json_shape_uses_camel_case_and_string_keys() {
        let poll = sample_poll();
        let json = serde_json::to_value(&poll).unwrap();
        assert_eq!(json["userId"], "owner");
        assert_eq!(json["votes"]["0"], 0);
        assert!(json.get("createdAt").is_some());
    }
}
