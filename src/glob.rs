//! Glob used to pick which files in the image directory get packed.
//!
//! Wraps globset's `Glob` and its compiled matcher together so the pair can be
//! deserialized straight out of a project file. `*` never crosses a path
//! separator, so the default `*.png` only matches the top level of the
//! directory and `**/*.png` has to be asked for explicitly.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use globset::{GlobBuilder, GlobMatcher};
use serde::{de::Error as _, Deserialize, Deserializer};

#[derive(Debug, Clone)]
pub struct InputGlob {
    pattern: String,
    matcher: GlobMatcher,
}

impl InputGlob {
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        Ok(InputGlob {
            pattern: pattern.to_owned(),
            matcher,
        })
    }

    /// Matches a path relative to the image directory.
    pub fn is_match<P: AsRef<Path>>(&self, relative_path: P) -> bool {
        self.matcher.is_match(relative_path)
    }

    /// The leading directories of the pattern that contain no pattern syntax.
    /// Searching can start there instead of at the root of the image
    /// directory.
    pub fn search_root(&self) -> PathBuf {
        let mut prefix = PathBuf::new();
        let mut components = Path::new(&self.pattern).iter().peekable();

        while let Some(component) = components.next() {
            // The last component names files, not a directory to search.
            if components.peek().is_none() {
                break;
            }

            let is_literal = component
                .to_str()
                .map(|text| !text.chars().any(|c| GLOB_PATTERN_CHARACTERS.contains(c)))
                .unwrap_or(false);

            if !is_literal {
                break;
            }

            prefix.push(component);
        }

        prefix
    }
}

// Characters that might indicate glob pattern syntax. Escapes like `[*]` are
// treated as patterns too, which only means searching starts higher up.
const GLOB_PATTERN_CHARACTERS: &str = "*?{}[]";

impl PartialEq for InputGlob {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for InputGlob {}

impl<'de> Deserialize<'de> for InputGlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;

        InputGlob::new(&pattern).map_err(D::Error::custom)
    }
}

impl fmt::Display for InputGlob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn glob(pattern: &str) -> InputGlob {
        InputGlob::new(pattern).unwrap()
    }

    #[test]
    fn star_stays_in_one_directory() {
        let top_level = glob("*.png");

        assert!(top_level.is_match("icon.png"));
        assert!(!top_level.is_match("icons/icon.png"));
        assert!(!top_level.is_match("icon.jpg"));

        assert!(glob("**/*.png").is_match("icons/small/icon.png"));
    }

    #[test]
    fn search_root_of_nested_pattern() {
        assert_eq!(glob("ui/buttons/*.png").search_root(), PathBuf::from("ui/buttons"));
        assert_eq!(glob("ui/**/idle-*.png").search_root(), PathBuf::from("ui"));
    }

    #[test]
    fn search_root_of_top_level_pattern() {
        assert_eq!(glob("*.png").search_root(), PathBuf::new());
        assert_eq!(glob("**/*.png").search_root(), PathBuf::new());
    }

    #[test]
    fn literal_file_searches_its_folder() {
        assert_eq!(glob("ui/logo.png").search_root(), PathBuf::from("ui"));
    }

    #[test]
    fn deserializes_from_string() {
        #[derive(Deserialize)]
        struct Holder {
            glob: InputGlob,
        }

        let holder: Holder = toml::from_str(r#"glob = "sprites/*.png""#).unwrap();

        assert_eq!(holder.glob, glob("sprites/*.png"));
        assert_eq!(holder.glob.to_string(), "sprites/*.png");
    }
}
