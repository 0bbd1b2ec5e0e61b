use serde::{Deserialize, Serialize};

/// Review status of a homework submission as reported by the review API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Parse the raw `status` string from the API. Unknown values yield `None`.
    pub fn from_api(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(HomeworkStatus::Approved),
            "reviewing" => Some(HomeworkStatus::Reviewing),
            "rejected" => Some(HomeworkStatus::Rejected),
            _ => None,
        }
    }

    /// The fixed human-readable verdict sentence for this status.
    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}
