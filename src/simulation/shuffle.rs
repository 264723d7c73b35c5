use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded Fisher–Yates shuffle of faction ids.
///
/// Walks from the last index down to 1, swapping each slot with a uniform
/// draw from `[0, i]`. One ChaCha8 stream per call, one draw per swap, so the
/// same seed and input order always give the same result.
pub fn shuffle_factions<'a>(faction_ids: impl IntoIterator<Item = &'a String>, seed: u64) -> Vec<String> {
    let mut shuffled: Vec<String> = faction_ids.into_iter().cloned().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }

    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Roster;

    fn roster_ids() -> Vec<String> {
        Roster::builtin().factions.into_iter().map(|f| f.id).collect()
    }

    #[test]
    fn same_seed_same_order() {
        let ids = roster_ids();
        assert_eq!(shuffle_factions(&ids, 42), shuffle_factions(&ids, 42));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let ids = roster_ids();
        let mut shuffled = shuffle_factions(&ids, 7);
        shuffled.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(shuffled, expected);
    }

    #[test]
    fn different_seeds_reorder() {
        let ids = roster_ids();
        let orders: Vec<Vec<String>> = (1..=5).map(|seed| shuffle_factions(&ids, seed)).collect();
        assert!(orders.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn tiny_inputs_survive() {
        let empty: Vec<String> = Vec::new();
        assert!(shuffle_factions(&empty, 3).is_empty());

        let single = vec!["shoal".to_string()];
        assert_eq!(shuffle_factions(&single, 3), single);
    }
}
