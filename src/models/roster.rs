use serde::{Deserialize, Serialize};

/// Number of robots generated when no count is given.
pub const DEFAULT_TEST_ROSTER_SIZE: usize = 16;

/// Input for adding a single contestant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddContestantInput {
    pub name: String,
}

/// Input for replacing the whole roster at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRosterInput {
    pub names: Vec<String>,
}

/// Input for generating a demo roster. Defaults to 16 robots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRosterInput {
    #[serde(default)]
    pub count: Option<usize>,
}

/// Response for roster generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRosterResponse {
    pub success: bool,
    pub message: String,
    pub robots: Vec<String>,
}
