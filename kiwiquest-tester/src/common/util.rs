use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Dump a failing save string next to the report so it can be replayed.
pub fn write_save_artifact(dir: &Path, scenario: &str, seed: u64, save: &str) -> Result<()> {
    fs::create_dir_all(dir).context("creating artifacts dir")?;
    let path = dir.join(format!("{scenario}-seed-{seed}.json"));
    fs::write(&path, save).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn split_csv_of_blank_is_empty() {
        assert!(split_csv(" , ,").is_empty());
    }

    #[test]
    fn save_artifact_lands_in_named_file() {
        let base = std::env::temp_dir().join(format!(
            "kiwiquest-artifacts-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        write_save_artifact(&base, "save-roundtrip", 7, "{\"version\":1}").expect("write");
        let written = fs::read_to_string(base.join("save-roundtrip-seed-7.json")).unwrap();
        assert_eq!(written, "{\"version\":1}");
    }
}
