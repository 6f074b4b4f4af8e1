use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::bracket::MAX_BRACKET_SIZE;
use super::error::ValidationError;

/// Names handed out by [`Roster::generate_test_roster`], in order.
const TEST_ROBOT_NAMES: &[&str] = &[
    "Wackel-Bot 3000",
    "Chaos-Maschine",
    "Crash-Dummy",
    "Shake-n-Break",
    "Sturz-Roboter",
    "Mega-Wackler",
    "Schrott-König",
    "Bumm-Bot",
    "Zitter-Zerstörer",
    "Krach-Kiste",
    "Wums-Wurm",
    "Rüttel-Rex",
    "Kipp-Bot",
    "Vibro-Fighter",
    "Dosen-Drache",
    "Klebeband-Koloss",
];

/// Ordered set of contestant names.
///
/// Names are compared exactly (case-sensitive) after trimming surrounding
/// whitespace. Insertion order is preserved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn list(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Validate a name for insertion without changing the roster.
    pub(crate) fn check_add(&self, name: &str) -> Result<String, ValidationError> {
        let name = normalize(name)?;
        if self.contains(&name) {
            return Err(ValidationError::DuplicateName(name));
        }
        Ok(name)
    }

    /// Append a name, returning it as stored (trimmed).
    pub fn add(&mut self, name: &str) -> Result<String, ValidationError> {
        let name = self.check_add(name)?;
        self.names.push(name.clone());
        Ok(name)
    }

    pub fn remove(&mut self, name: &str) -> Result<String, ValidationError> {
        let index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ValidationError::NotFound(name.to_string()))?;
        Ok(self.names.remove(index))
    }

    /// Build a roster from an incoming list, rejecting blanks and duplicates.
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for raw in names {
            let name = normalize(raw.as_ref())
                .map_err(|_| ValidationError::InvalidRoster("names must not be empty".into()))?;
            if !seen.insert(name.clone()) {
                return Err(ValidationError::InvalidRoster(format!(
                    "\"{name}\" appears more than once"
                )));
            }
            out.push(name);
        }
        Ok(Self { names: out })
    }

    /// Deterministic demo roster of `count` robot names.
    ///
    /// Past the end of the built-in list, names repeat with a "Mk N" suffix so
    /// every generated name stays unique.
    pub fn generate_test_roster(count: usize) -> Result<Self, ValidationError> {
        if count == 0 {
            return Err(ValidationError::InvalidRoster(
                "test roster needs at least one contestant".into(),
            ));
        }
        if count > MAX_BRACKET_SIZE {
            return Err(ValidationError::InvalidRoster(format!(
                "test roster is limited to {MAX_BRACKET_SIZE} contestants, got {count}"
            )));
        }
        let names = (0..count).map(|i| {
            let base = TEST_ROBOT_NAMES[i % TEST_ROBOT_NAMES.len()];
            match i / TEST_ROBOT_NAMES.len() {
                0 => base.to_string(),
                generation => format!("{base} Mk {}", generation + 1),
            }
        });
        Self::from_names(names)
    }
}

fn normalize(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}
