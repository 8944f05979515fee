//! Tier integration.
//!
//! Scraped tier listings arrive as position-group pages ("PPR RB",
//! "0.5 PPR Flex") mapping tier numbers to player names. This module
//! inverts them into a per-player lookup, resolves which pages a league's
//! scoring settings point at, and strips the scoring prefixes so the
//! lineup optimizer can ask for a rank by bare position.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::snapshots::TierSnapshot;
use crate::types::{SlotLabel, TierRank};

/// Name suffixes that tier pages sometimes include and roster sources
/// sometimes drop. Both forms are indexed.
const NAME_SUFFIXES: &[&str] = &["Jr.", "Sr.", "III", "II"];

// ---------------------------------------------------------------------------
// Tier book
// ---------------------------------------------------------------------------

/// Reverse mapping of a tier snapshot: player display name → page → tier.
///
/// A player missing from a page is "Unranked" there — the absence of an
/// entry, never tier 0.
#[derive(Debug, Clone, Default)]
pub struct TierBook {
    ranks: HashMap<String, HashMap<String, u32>>,
}

impl TierBook {
    pub fn from_snapshot(snapshot: &TierSnapshot) -> Self {
        let mut ranks: HashMap<String, HashMap<String, u32>> = HashMap::new();

        for (page, tiers) in &snapshot.pages {
            for (tier_str, names) in tiers {
                let Ok(tier) = tier_str.parse::<u32>() else {
                    debug!(page = %page, tier = %tier_str, "Unparsable tier number, skipping");
                    continue;
                };
                for name in names {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    if let Some(short) = truncated_form(name) {
                        ranks
                            .entry(short)
                            .or_default()
                            .insert(page.clone(), tier);
                    }
                    ranks
                        .entry(name.to_string())
                        .or_default()
                        .insert(page.clone(), tier);
                }
            }
        }

        Self { ranks }
    }

    /// Tier rank for a player on an exact page name.
    pub fn rank(&self, name: &str, page: &str) -> Option<u32> {
        self.ranks.get(name).and_then(|pages| pages.get(page)).copied()
    }

    /// Every page the player is ranked on.
    pub fn pages_for(&self, name: &str) -> Option<&HashMap<String, u32>> {
        self.ranks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ranks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// First-two-token form for suffixed multi-word names, so "Kenneth Walker
/// III" also resolves as "Kenneth Walker".
fn truncated_form(name: &str) -> Option<String> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() >= 3 && NAME_SUFFIXES.iter().any(|s| name.contains(s)) {
        Some(tokens[..2].join(" "))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// League scoring → page prefixes
// ---------------------------------------------------------------------------

/// The tier-page prefixes a league's reception scoring points at.
/// Non-standard TE-premium values round to the nearest published page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPrefixes {
    /// Prefix for RB/WR/Flex pages.
    pub skill: String,
    /// Prefix for the TE page (reception value plus any TE bonus).
    pub te: String,
}

impl TierPrefixes {
    pub fn from_scoring(scoring: &std::collections::BTreeMap<String, f64>) -> Self {
        let rec = scoring.get("rec").copied().unwrap_or(0.0);
        let te_rec = rec + scoring.get("bonus_rec_te").copied().unwrap_or(0.0);

        let skill = if rec <= 0.0 {
            ""
        } else if rec < 1.0 {
            "0.5 PPR "
        } else {
            "PPR "
        };

        let te = if te_rec < 0.25 {
            ""
        } else if te_rec < 0.75 {
            "0.5 PPR "
        } else {
            "PPR "
        };

        Self {
            skill: skill.to_string(),
            te: te.to_string(),
        }
    }

    /// Strip whichever prefix a page name carries, leaving the bare
    /// position-group name.
    fn strip<'a>(&self, page: &'a str) -> &'a str {
        let mut cleaned = page;
        for prefix in [&self.skill, &self.te] {
            if !prefix.is_empty() {
                if let Some(rest) = cleaned.strip_prefix(prefix.as_str()) {
                    cleaned = rest;
                }
            }
        }
        cleaned
    }
}

// ---------------------------------------------------------------------------
// Per-league resolved tiers
// ---------------------------------------------------------------------------

/// A league-specific view of the tier book: only the pages this league's
/// slots and scoring care about, with prefixes stripped so lookups use
/// bare position names ("RB", "Flex", "QB", …).
#[derive(Debug, Clone, Default)]
pub struct LeagueTiers {
    ranks: HashMap<String, HashMap<String, u32>>,
}

impl LeagueTiers {
    /// Resolve tier pages for every listed player.
    ///
    /// An RB or WR ranked tier 3 or better at its own position but absent
    /// from the Flex page is promoted to Flex tier 1 — top positional
    /// players are always flex-worthy even when the Flex page lags.
    pub fn resolve<'a>(
        book: &TierBook,
        prefixes: &TierPrefixes,
        slots: &[SlotLabel],
        players: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let wanted = wanted_pages(slots, prefixes);
        let mut ranks: HashMap<String, HashMap<String, u32>> = HashMap::new();

        for player in players {
            let mut resolved: HashMap<String, u32> = HashMap::new();
            let mut top_tier_skill = false;

            if let Some(pages) = book.pages_for(player) {
                for (page, &tier) in pages {
                    if !wanted.contains(page.as_str()) {
                        continue;
                    }
                    let cleaned = prefixes.strip(page);
                    if (cleaned == "RB" || cleaned == "WR") && tier <= 3 {
                        top_tier_skill = true;
                    }
                    resolved.insert(cleaned.to_string(), tier);
                }
            }

            if top_tier_skill && !resolved.contains_key("Flex") {
                resolved.insert("Flex".to_string(), 1);
            }

            ranks.insert(player.to_string(), resolved);
        }

        Self { ranks }
    }

    /// Tier rank at a bare position-group page. Unknown players and
    /// unranked pages both return the Unranked sentinel state.
    pub fn rank(&self, player: &str, page: &str) -> TierRank {
        TierRank::from_option(
            self.ranks
                .get(player)
                .and_then(|pages| pages.get(page))
                .copied(),
        )
    }

    /// Tier rank on the Flex page.
    pub fn flex_rank(&self, player: &str) -> TierRank {
        self.rank(player, "Flex")
    }
}

/// The exact page names a league's slot layout needs, given its prefixes.
fn wanted_pages(slots: &[SlotLabel], prefixes: &TierPrefixes) -> HashSet<String> {
    let mut pages = HashSet::new();
    for slot in slots {
        match slot {
            SlotLabel::Qb | SlotLabel::SuperFlex => {
                pages.insert("QB".to_string());
            }
            SlotLabel::Rb => {
                pages.insert(format!("{}RB", prefixes.skill));
            }
            SlotLabel::Wr => {
                pages.insert(format!("{}WR", prefixes.skill));
            }
            SlotLabel::Te => {
                pages.insert(format!("{}TE", prefixes.te));
            }
            SlotLabel::Flex | SlotLabel::RecFlex => {
                pages.insert(format!("{}Flex", prefixes.skill));
            }
            SlotLabel::K => {
                pages.insert("K".to_string());
            }
            SlotLabel::Def => {
                pages.insert("DST".to_string());
            }
            SlotLabel::Bench => {}
        }
    }
    // Flex rankings double as a tie-breaker even in leagues without a
    // declared flex slot.
    pages.insert(format!("{}Flex", prefixes.skill));
    pages
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
