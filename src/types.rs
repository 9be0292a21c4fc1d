use std::path::PathBuf;

use serde::Deserialize;

/// Separates the forward and reverse read files in a single-string spec.
pub const DIRECTION_DELIMITER: char = ':';

/// Separates raw fragment files within one read direction.
pub const FRAGMENT_DELIMITER: char = ',';

/// Accepted in place of [`FRAGMENT_DELIMITER`] and normalised to it.
pub const ALT_FRAGMENT_DELIMITER: char = ';';

/// Read specification exactly as written in `[samples]`.
///
/// ```toml
/// [samples]
/// S1 = "reads/S1_1.fq:reads/S1_2.fq"
/// S2 = ["lane1_R1.fq,lane2_R1.fq", "lane1_R2.fq;lane2_R2.fq"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawReadSpec {
    Single(String),
    Fragmented(Vec<String>),
}

/// Shape of one sample's read files, resolved once at config ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadSpec {
    /// One forward and one reverse file, used directly.
    SingleDelimited { forward: PathBuf, reverse: PathBuf },
    /// Several raw fragment files per direction, concatenated in list order
    /// before QC.
    Fragmented {
        forward: Vec<PathBuf>,
        reverse: Vec<PathBuf>,
    },
}

impl ReadSpec {
    /// Resolve a raw spec into its tagged shape.
    ///
    /// Returns a human-readable reason on malformed input; the config
    /// validator attaches the sample name.
    pub fn from_raw(raw: &RawReadSpec) -> Result<Self, String> {
        match raw {
            RawReadSpec::Single(s) => {
                let parts: Vec<&str> = s.split(DIRECTION_DELIMITER).map(str::trim).collect();
                match parts.as_slice() {
                    [fwd, rev] if !fwd.is_empty() && !rev.is_empty() => {
                        Ok(ReadSpec::SingleDelimited {
                            forward: PathBuf::from(fwd),
                            reverse: PathBuf::from(rev),
                        })
                    }
                    _ => Err(format!(
                        "expected \"<forward>{DIRECTION_DELIMITER}<reverse>\", got {s:?}"
                    )),
                }
            }
            RawReadSpec::Fragmented(groups) => {
                if groups.len() != 2 {
                    return Err(format!(
                        "expected exactly 2 fragment groups (R1, R2), got {}",
                        groups.len()
                    ));
                }
                let forward = split_fragments(&groups[0])?;
                let reverse = split_fragments(&groups[1])?;
                Ok(ReadSpec::Fragmented { forward, reverse })
            }
        }
    }
}

fn split_fragments(group: &str) -> Result<Vec<PathBuf>, String> {
    let normalised = group.replace(ALT_FRAGMENT_DELIMITER, &FRAGMENT_DELIMITER.to_string());
    let mut files = Vec::new();
    for part in normalised.split(FRAGMENT_DELIMITER) {
        let part = part.trim();
        if part.is_empty() {
            return Err(format!("empty fragment path in group {group:?}"));
        }
        files.push(PathBuf::from(part));
    }
    Ok(files)
}
