use anyhow::{Context, Result, bail};
use construction_disaster::{Difficulty, DifficultyPreset};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
/// Upper bound on seeds produced by a single range token.
const MAX_RANGE_LEN: u64 = 100_000;

/// Resolve CLI seed tokens into a deduplicated list, preserving first-seen order.
///
/// Supports literal integers (negative values use their magnitude) and
/// ranges written `a..b` (end exclusive) or `a..=b` (end inclusive).
/// An empty input falls back to the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        for seed in expand_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn expand_token(token: &str) -> Result<Vec<u64>> {
    if let Some((start, end)) = token.split_once("..") {
        let (end, inclusive) = end
            .strip_prefix('=')
            .map_or((end, false), |rest| (rest, true));
        let start = parse_seed(start)?;
        let end = parse_seed(end)?;
        let end = if inclusive {
            end.checked_add(1)
                .with_context(|| format!("seed range overflows: {token}"))?
        } else {
            end
        };
        if start > end {
            bail!("seed range is reversed: {token}");
        }
        if end - start > MAX_RANGE_LEN {
            bail!("seed range {token} exceeds {MAX_RANGE_LEN} seeds");
        }
        return Ok((start..end).collect());
    }
    Ok(vec![parse_seed(token)?])
}

fn parse_seed(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    raw.parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {raw}"))
}

/// Resolve difficulty tokens: preset names or positive multipliers.
pub fn resolve_difficulty_inputs(tokens: &[String]) -> Result<Vec<Difficulty>> {
    let mut difficulties: Vec<Difficulty> = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let difficulty = parse_difficulty(token)?;
        if !difficulties.contains(&difficulty) {
            difficulties.push(difficulty);
        }
    }
    if difficulties.is_empty() {
        difficulties.push(Difficulty::default());
    }
    Ok(difficulties)
}

fn parse_difficulty(token: &str) -> Result<Difficulty> {
    let preset = [
        DifficultyPreset::Relaxing,
        DifficultyPreset::Normal,
        DifficultyPreset::Challenging,
    ]
    .into_iter()
    .find(|preset| preset.key().eq_ignore_ascii_case(token));
    if let Some(preset) = preset {
        return Ok(Difficulty::from(preset));
    }

    let value: f32 = token
        .parse()
        .with_context(|| format!("Unrecognized difficulty: {token}"))?;
    Difficulty::new(value).with_context(|| format!("Invalid difficulty: {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn resolves_literals_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "1..4", "10..=11"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 1, 2, 3, 10, 11]);
    }

    #[test]
    fn deduplicates_in_first_seen_order() {
        let seeds = resolve_seed_inputs(&tokens(&["3", "1..5", "3"])).unwrap();
        assert_eq!(seeds, vec![3, 1, 2, 4]);
    }

    #[test]
    fn empty_input_uses_default_seed() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![1337]);
        assert_eq!(resolve_seed_inputs(&tokens(&["", " "])).unwrap(), vec![1337]);
    }

    #[test]
    fn rejects_garbage_and_reversed_ranges() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..1000000"])).is_err());
    }

    #[test]
    fn resolves_difficulty_presets_and_numbers() {
        let parsed = resolve_difficulty_inputs(&tokens(&["relaxing", "Challenging", "1.5", "2"]))
            .unwrap();
        let values: Vec<f32> = parsed.iter().map(|d| d.multiplier()).collect();
        assert_eq!(values, vec![0.5, 2.0, 1.5]);
        assert!(resolve_difficulty_inputs(&tokens(&["0"])).is_err());
        assert!(resolve_difficulty_inputs(&tokens(&["extreme"])).is_err());
        assert_eq!(
            resolve_difficulty_inputs(&[]).unwrap(),
            vec![Difficulty::default()]
        );
    }
}
