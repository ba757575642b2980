//! Most-active hotspot selection
//!
//! Checklist volume is the proxy for data reliability: the hotspot with the
//! most submitted checklists wins.

use crate::models::Hotspot;
use birdscape_common::{Error, Result};

/// Pick the hotspot with maximal checklist count
///
/// Ties break to the first-encountered hotspot (strict-greater comparison,
/// no secondary key), so the result is deterministic for a given input
/// order. Empty input is the recoverable `NoHotspotsFound` condition.
pub fn pick_most_active(hotspots: &[Hotspot]) -> Result<&Hotspot> {
    let mut best: Option<&Hotspot> = None;

    for hotspot in hotspots {
        match best {
            Some(current) if hotspot.num_checklists > current.num_checklists => {
                best = Some(hotspot)
            }
            None => best = Some(hotspot),
            _ => {}
        }
    }

    best.ok_or(Error::NoHotspotsFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(loc_id: &str, num_checklists: u32) -> Hotspot {
        Hotspot {
            loc_id: loc_id.to_string(),
            name: format!("Hotspot {}", loc_id),
            latitude: 0.0,
            longitude: 0.0,
            num_checklists,
            country_code: "CO".to_string(),
            subnational1_code: "CO-ANT".to_string(),
            subnational2_code: String::new(),
            is_hotspot: true,
        }
    }

    #[test]
    fn test_picks_maximal_checklist_count() {
        let hotspots = vec![hotspot("L1", 12), hotspot("L2", 47), hotspot("L3", 3)];
        let winner = pick_most_active(&hotspots).unwrap();
        assert_eq!(winner.loc_id, "L2");
    }

    #[test]
    fn test_tie_breaks_to_first_encountered() {
        let hotspots = vec![hotspot("L1", 5), hotspot("L2", 9), hotspot("L3", 9)];
        let winner = pick_most_active(&hotspots).unwrap();
        assert_eq!(winner.loc_id, "L2");
    }

    #[test]
    fn test_single_hotspot() {
        let hotspots = vec![hotspot("L1", 0)];
        assert_eq!(pick_most_active(&hotspots).unwrap().loc_id, "L1");
    }

    #[test]
    fn test_empty_is_no_hotspots_found() {
        assert!(matches!(
            pick_most_active(&[]),
            Err(Error::NoHotspotsFound)
        ));
    }
}
