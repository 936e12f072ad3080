use crate::browser;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

const USER_KEY: &str = "user";
const SCORES_KEY: &str = "scores";
const MAX_ENTRIES: usize = 5;
const FALLBACK_NAME: &str = "Player";

const EMOJIS: [&str; 10] = ["🦔", "🐵", "🐶", "🐹", "🦊", "🦁", "🦄", "🦓", "🦒", "🦙"];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Profile {
    pub name: String,
    pub emoji: String,
}

impl Profile {
    /// Returning players come back out of local storage. First-timers get
    /// prompted for a name and a mascot assigned for good.
    pub fn load_or_register<R: Rng>(rng: &mut R) -> Result<Self> {
        if let Some(json) = browser::storage_item(USER_KEY)? {
            match serde_json::from_str(&json) {
                Ok(profile) => return Ok(profile),
                Err(err) => log!("Ignoring corrupt profile : {:#?}", err),
            }
        }
        let profile = Profile {
            name: resolve_name(browser::prompt("Enter your name:")?),
            emoji: random_emoji(rng),
        };
        browser::set_storage_item(USER_KEY, &serde_json::to_string(&profile)?)?;
        Ok(profile)
    }
}

/// A dismissed or blank prompt still has to produce a usable player name.
fn resolve_name(input: Option<String>) -> String {
    input
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

fn random_emoji<R: Rng>(rng: &mut R) -> String {
    EMOJIS[rng.gen_range(0..EMOJIS.len())].to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScoreEntry {
    pub name: String,
    pub emoji: String,
    pub score: u32,
}

/// Stored as a bare JSON array under the `scores` key.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn load() -> Self {
        match browser::storage_item(SCORES_KEY) {
            Ok(Some(json)) => Self::from_json(&json),
            Ok(None) => Leaderboard::default(),
            Err(err) => {
                log!("Error reading the score table : {:#?}", err);
                Leaderboard::default()
            }
        }
    }

    /// A corrupt table is dropped rather than letting a cosmetic feature
    /// take the game down with it.
    fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log!("Ignoring corrupt score table : {:#?}", err);
            Leaderboard::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        browser::set_storage_item(SCORES_KEY, &serde_json::to_string(self)?)
    }

    /// Fold a finished run into the table : one row per player, keyed by
    /// name, keeping that player's best score, sorted best first, top five
    /// rows only.
    pub fn record(&mut self, profile: &Profile, score: u32) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name == profile.name)
        {
            Some(entry) => entry.score = entry.score.max(score),
            None => self.entries.push(ScoreEntry {
                name: profile.name.clone(),
                emoji: profile.emoji.clone(),
                score,
            }),
        }
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }
}
