use super::Poll;
use serde::{Deserialize, Serialize};

/// Total used for percentages; never zero so an empty poll renders as 0%.
pub fn display_total(poll: &Poll) -> u32 {
    poll.total_votes().max(1)
}

pub fn percentage(count: u32, total: u32) -> u32 {
    let total = total.max(1);
    ((count as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionResult {
    pub index: usize,
    pub label: String,
    pub votes: u32,
    pub percent: u32,
}

/// A poll as one particular viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub owner_id: String,
    pub options: Vec<OptionResult>,
    pub total: u32,
    pub vote_count: u32,
    pub my_choice: Option<usize>,
}

impl PollView {
    pub fn new(poll: &Poll, viewer: Option<&str>) -> Self {
        let total = display_total(poll);
        let options = poll
            .options
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let votes = poll.vote_count(index);
                OptionResult {
                    index,
                    label: label.clone(),
                    votes,
                    percent: percentage(votes, total),
                }
            })
            .collect();

        Self {
            id: poll.id.clone(),
            title: poll.title.clone(),
            category: poll.category.clone(),
            owner_id: poll.user_id.clone(),
            options,
            total,
            vote_count: poll.total_votes(),
            my_choice: viewer.and_then(|uid| poll.choice_of(uid)),
        }
    }

    pub fn total_label(&self) -> String {
        if self.total == 1 {
            "1 vote".to_string()
        } else {
            format!("{} votes", self.total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn poll_with_votes(votes: &[(usize, u32)]) -> Poll {
        Poll {
            id: "p".to_string(),
            title: "Q".to_string(),
            options: votes.iter().map(|(i, _)| format!("Option {i}")).collect(),
            votes: votes.iter().map(|(i, v)| (i.to_string(), *v)).collect(),
            voters: BTreeMap::new(),
            category: "Uncategorized".to_string(),
            user_id: "owner".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_percentages_three_to_one() {
        let poll = poll_with_votes(&[(0, 3), (1, 1)]);
        let view = PollView::new(&poll, None);
        assert_eq!(view.total, 4);
        assert_eq!(view.options[0].percent, 75);
        assert_eq!(view.options[1].percent, 25);
    }

    #[test]
    fn test_zero_votes_shows_total_one() {
        let poll = poll_with_votes(&[(0, 0), (1, 0), (2, 0)]);
        let view = PollView::new(&poll, None);
        assert_eq!(view.total, 1);
        assert_eq!(view.vote_count, 0);
        assert!(view.options.iter().all(|o| o.percent == 0));
        assert_eq!(view.total_label(), "1 vote");
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_my_choice_follows_viewer() {
        let mut poll = poll_with_votes(&[(0, 1), (1, 0)]);
        poll.voters.insert("alice".to_string(), 0);
        assert_eq!(PollView::new(&poll, Some("alice")).my_choice, Some(0));
        assert_eq!(PollView::new(&poll, Some("bob")).my_choice, None);
        assert_eq!(PollView::new(&poll, None).my_choice, None);
    }
}
