//! Slot-to-pool resolution.
//!
//! Each lineup slot draws candidates from a fixed set of position pools
//! and ranks them against one tier page. Bench slots have no fixed pool —
//! they fall back to whatever pool still has players, resolved at fill
//! time by the optimizer.

use crate::types::{Position, SlotLabel};

/// The position pools a slot draws from. Flex-family slots union several
/// pools; superflex draws quarterbacks; bench is the empty set (explicit
/// fallback handled by the filler).
pub fn eligible_positions(slot: SlotLabel) -> &'static [Position] {
    match slot {
        SlotLabel::Qb | SlotLabel::SuperFlex => &[Position::QB],
        SlotLabel::Rb => &[Position::RB],
        SlotLabel::Wr => &[Position::WR],
        SlotLabel::Te => &[Position::TE],
        SlotLabel::K => &[Position::K],
        SlotLabel::Def => &[Position::DEF],
        SlotLabel::Flex => &[Position::WR, Position::TE, Position::RB],
        SlotLabel::RecFlex => &[Position::WR, Position::TE],
        SlotLabel::Bench => &[],
    }
}

/// The tier page a slot's candidates are ranked on. Bench slots rank on
/// the fallback pool's own page, so they have none here.
pub fn tier_page(slot: SlotLabel) -> Option<&'static str> {
    match slot {
        SlotLabel::Qb | SlotLabel::SuperFlex => Some("QB"),
        SlotLabel::Rb => Some("RB"),
        SlotLabel::Wr => Some("WR"),
        SlotLabel::Te => Some("TE"),
        SlotLabel::K => Some("K"),
        SlotLabel::Def => Some("DST"),
        SlotLabel::Flex | SlotLabel::RecFlex => Some("Flex"),
        SlotLabel::Bench => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_unions_skill_pools() {
        assert_eq!(
            eligible_positions(SlotLabel::Flex),
            &[Position::WR, Position::TE, Position::RB]
        );
    }

    #[test]
    fn test_rec_flex_excludes_running_backs() {
        assert!(!eligible_positions(SlotLabel::RecFlex).contains(&Position::RB));
    }

    #[test]
    fn test_superflex_draws_quarterbacks() {
        assert_eq!(eligible_positions(SlotLabel::SuperFlex), &[Position::QB]);
        assert_eq!(tier_page(SlotLabel::SuperFlex), Some("QB"));
    }

    #[test]
    fn test_bench_is_fallback() {
        assert!(eligible_positions(SlotLabel::Bench).is_empty());
        assert_eq!(tier_page(SlotLabel::Bench), None);
    }

    #[test]
    fn test_flex_family_ranks_on_flex_page() {
        assert_eq!(tier_page(SlotLabel::Flex), Some("Flex"));
        assert_eq!(tier_page(SlotLabel::RecFlex), Some("Flex"));
    }

    #[test]
    fn test_positional_slots_rank_on_own_page() {
        assert_eq!(tier_page(SlotLabel::Rb), Some("RB"));
        assert_eq!(tier_page(SlotLabel::Def), Some("DST"));
    }
}
