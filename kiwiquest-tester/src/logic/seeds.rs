use anyhow::{Result, bail};
use kiwiquest_game::derive_stream_seed;

const TEXT_SEED_TAG: &[u8] = b"KIWIQ-CLI";

/// Resolve CLI seed tokens into numeric seeds.
///
/// Integers are taken as-is (negative values by magnitude). Any other token is
/// hashed, so `--seeds kiwi,kakapo` is as reproducible as `--seeds 1,2`.
/// Duplicates are dropped, keeping the first occurrence.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            text_seed(token)
        };

        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        bail!("no seeds provided");
    }

    Ok(seeds)
}

fn text_seed(token: &str) -> u64 {
    derive_stream_seed(0, &[TEXT_SEED_TAG, token.to_lowercase().as_bytes()].concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn numeric_and_negative_seeds() {
        let seeds = resolve_seed_inputs(&tokens(&["1337", "-5", "18446744073709551615"])).unwrap();
        assert_eq!(seeds, vec![1337, 5, u64::MAX]);
    }

    #[test]
    fn text_seeds_are_stable_and_case_insensitive() {
        let a = resolve_seed_inputs(&tokens(&["Kiwi"])).unwrap();
        let b = resolve_seed_inputs(&tokens(&["kiwi"])).unwrap();
        assert_eq!(a, b);
        let other = resolve_seed_inputs(&tokens(&["tuatara"])).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let seeds = resolve_seed_inputs(&tokens(&["3", "1", "3", "", "1"])).unwrap();
        assert_eq!(seeds, vec![3, 1]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(resolve_seed_inputs(&tokens(&["", ""])).is_err());
        assert!(resolve_seed_inputs(&[]).is_err());
    }
}
