use std::{
    fs::{self, DirBuilder, File},
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use color_eyre::{eyre::eyre, eyre::Context, Result};

pub fn create_file<'a>(path: &Path, filename: &'a str, buff_write: &'a [u8]) -> Result<()> {
    let file_path = path.join(filename);

    File::create(&file_path)
        .with_context(|| format!("Could not create file {file_path:?}"))?
        .write_all(buff_write)
        .with_context(|| format!("Could not write to file {file_path:?}"))
}

pub fn create_directory(path_create: &Path) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .create(path_create)
        .with_context(|| format!("Could not create directory {path_create:?}"))
}

/// Removes a file or a directory tree if it's present on the fs,
/// quietly doing nothing otherwise
pub fn remove_if_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if path.is_dir() {
        fs::remove_dir_all(path).with_context(|| format!("Could not remove directory {path:?}"))
    } else {
        fs::remove_file(path).with_context(|| format!("Could not remove file {path:?}"))
    }
}

/// Resolves `path` against the process working directory when it is
/// relative, leaving absolute paths untouched
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .with_context(|| "Could not determine the current working directory")?;
    Ok(cwd.join(path))
}

/// Recursively copies the directory rooted at `source` into `destination`,
/// creating `destination` and any missing parent on the way.
///
/// App bundles are plain directory trees, so a plain file-by-file copy is
/// all that a deploy-dir export needs
pub fn copy_dir_recursive(source: &Path, destination: &Path) -> Result<()> {
    create_directory(destination)?;

    for entry in
        fs::read_dir(source).with_context(|| format!("Could not read directory {source:?}"))?
    {
        let entry = entry.with_context(|| format!("Could not read an entry of {source:?}"))?;
        let path = entry.path();
        let file_name = path
            .file_name()
            .ok_or_else(|| eyre!("Invalid file name in {path:?}"))?;
        let dest_path = destination.join(file_name);

        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            fs::copy(&path, &dest_path)
                .with_context(|| format!("Could not copy {path:?} to {dest_path:?}"))?;
        }
    }

    Ok(())
}

/// Zips the directory bundle at `bundle` into a sibling `<bundle>.zip`,
/// archiving paths relative to the bundle's parent so the archive unpacks
/// to the bare bundle
pub fn zip_dir(bundle: &Path) -> Result<PathBuf> {
    let parent = bundle
        .parent()
        .ok_or_else(|| eyre!("Cannot zip a path without a parent directory: {bundle:?}"))?;
    let name = bundle
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("Cannot zip a path without a valid file name: {bundle:?}"))?;
    let zip_path = PathBuf::from(format!("{}.zip", bundle.display()));

    remove_if_exists(&zip_path)?;

    let output = Command::new("zip")
        .arg("-qr")
        .arg(&zip_path)
        .arg(name)
        .current_dir(parent)
        .output()
        .with_context(|| format!("Could not run zip for {bundle:?}"))?;

    if !output.status.success() {
        return Err(eyre!(
            "zip exited with {} for {bundle:?}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(zip_path)
}

/// Returns the last `n` lines of `text` joined back with newlines,
/// or the full text when it has fewer lines
pub fn last_n_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_dir_recursive_replicates_the_tree() -> Result<()> {
        let temp = tempdir()?;
        let source = temp.path().join("App.app");
        create_directory(&source.join("PlugIns"))?;
        create_file(&source, "Info.plist", b"<plist/>")?;
        create_file(&source.join("PlugIns"), "Widget.appex", b"bin")?;

        let destination = temp.path().join("deploy").join("App.app");
        copy_dir_recursive(&source, &destination)?;

        assert!(destination.join("Info.plist").exists());
        assert!(destination.join("PlugIns").join("Widget.appex").exists());

        Ok(())
    }

    #[test]
    fn test_remove_if_exists_is_quiet_on_missing_paths() -> Result<()> {
        let temp = tempdir()?;
        remove_if_exists(&temp.path().join("never-created"))?;

        let file = temp.path().join("stale.log");
        create_file(temp.path(), "stale.log", b"old run")?;
        remove_if_exists(&file)?;
        assert!(!file.exists());

        Ok(())
    }

    #[test]
    fn test_last_n_lines() {
        let text = "one\ntwo\nthree\nfour";
        assert_eq!(last_n_lines(text, 2), "three\nfour");
        assert_eq!(last_n_lines(text, 10), text);
        assert_eq!(last_n_lines("", 3), "");
    }
}
