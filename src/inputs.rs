use std::{
    fmt,
    path::{self, Path, PathBuf},
};

use walkdir::WalkDir;

use crate::glob::InputGlob;

/// An image file found in the image directory, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path relative to the image directory, always using `/` as the
    /// separator. Used as the sprite's name in generated metadata.
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for InputFile {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(&self.name)
    }
}

/// Finds every file under `dir` matching `glob`, sorted by name so that
/// packing order is the same on every machine.
pub fn discover_inputs(dir: &Path, glob: &InputGlob) -> Result<Vec<InputFile>, walkdir::Error> {
    let search_path = dir.join(glob.search_root());
    log::trace!(
        "Searching for inputs in '{}' matching '{}'",
        search_path.display(),
        glob
    );

    let mut inputs = Vec::new();

    for entry in WalkDir::new(&search_path).follow_links(true) {
        let entry = entry?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };

        if !glob.is_match(relative) {
            continue;
        }

        let name = relative_name(relative);
        log::trace!("Found input {}", name);

        inputs.push(InputFile {
            name,
            path: entry.into_path(),
        });
    }

    inputs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(inputs)
}

fn relative_name(relative: &Path) -> String {
    let displayed = relative.display().to_string();

    // Keep names the same across platforms.
    if path::MAIN_SEPARATOR == '/' {
        displayed
    } else {
        displayed.replace(path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use fs_err as fs;

    fn names(inputs: &[InputFile]) -> Vec<&str> {
        inputs.iter().map(|input| input.name.as_str()).collect()
    }

    #[test]
    fn finds_top_level_matches_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"").unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.png"), b"").unwrap();

        let glob = InputGlob::new("*.png").unwrap();
        let inputs = discover_inputs(dir.path(), &glob).unwrap();

        assert_eq!(names(&inputs), vec!["a.png", "b.png"]);
        assert_eq!(inputs[0].path, dir.path().join("a.png"));
    }

    #[test]
    fn recursive_glob_uses_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui/buttons")).unwrap();
        fs::write(dir.path().join("ui/buttons/ok.png"), b"").unwrap();
        fs::write(dir.path().join("ui/logo.png"), b"").unwrap();
        fs::write(dir.path().join("root.png"), b"").unwrap();

        let glob = InputGlob::new("ui/**/*.png").unwrap();
        let inputs = discover_inputs(dir.path(), &glob).unwrap();

        assert_eq!(names(&inputs), vec!["ui/buttons/ok.png", "ui/logo.png"]);
    }
}
