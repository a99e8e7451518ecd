use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{LaunchError, LaunchResult};

/// Copy `source` into `destination`, skipping top level entries named in `ignored`
///
/// Only the copy root is filtered: `work/` is skipped but `modules/work` is copied. Symbolic
/// links are recreated with the same target and never followed, so dangling links stay
/// dangling. Existing files in `destination` are overwritten. Returns the number of files and
/// links written.
pub fn copy_tree(source: &Path, destination: &Path, ignored: &[&str]) -> LaunchResult<u64> {
    info!("Copying {} to {}", source.display(), destination.display());
    create_dir(destination)?;

    let mut copied = 0;
    for entry in read_dir(source)? {
        let entry = entry.map_err(|err| LaunchError::io(format!("can't read {}", source.display()), err))?;
        let name = entry.file_name();
        if ignored.iter().any(|ignore| name.as_os_str() == OsStr::new(ignore)) {
            info!("Not copying {}", entry.path().display());
            continue;
        }
        copied += copy_entry(&entry.path(), &destination.join(&name))?;
    }

    info!("Copied {copied} files to {}", destination.display());
    Ok(copied)
}

fn copy_entry(from: &Path, to: &Path) -> LaunchResult<u64> {
    let metadata = fs::symlink_metadata(from)
        .map_err(|err| LaunchError::io(format!("can't stat {}", from.display()), err))?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        copy_link(from, to)?;
        return Ok(1);
    }

    // never write through a link left behind by an earlier copy
    if is_symlink(to) {
        remove_existing(to)?;
    }

    if file_type.is_dir() {
        create_dir(to)?;
        let mut copied = 0;
        for entry in read_dir(from)? {
            let entry = entry.map_err(|err| LaunchError::io(format!("can't read {}", from.display()), err))?;
            copied += copy_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        return Ok(copied);
    }

    fs::copy(from, to)
        .map_err(|err| LaunchError::io(format!("can't copy {} to {}", from.display(), to.display()), err))?;
    Ok(1)
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> LaunchResult<()> {
    let target = fs::read_link(from)
        .map_err(|err| LaunchError::io(format!("can't read link {}", from.display()), err))?;
    if fs::symlink_metadata(to).is_ok() {
        remove_existing(to)?;
    }
    std::os::unix::fs::symlink(&target, to)
        .map_err(|err| LaunchError::io(format!("can't link {} to {}", to.display(), target.display()), err))
}

#[cfg(not(unix))]
fn copy_link(from: &Path, _to: &Path) -> LaunchResult<()> {
    warn!("Symbolic links are not supported on this platform, skipping {}", from.display());
    Ok(())
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()).unwrap_or(false)
}

fn remove_existing(path: &Path) -> LaunchResult<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(m) if m.is_dir() => {
            warn!("Replacing directory {} with a link", path.display());
            fs::remove_dir_all(path)
        }
        _ => fs::remove_file(path),
    };
    result.map_err(|err| LaunchError::io(format!("can't remove {}", path.display()), err))
}

fn create_dir(path: &Path) -> LaunchResult<()> {
    fs::create_dir_all(path)
        .map_err(|err| LaunchError::io(format!("can't create directory {}", path.display()), err))
}

fn read_dir(path: &Path) -> LaunchResult<fs::ReadDir> {
    fs::read_dir(path)
        .map_err(|err| LaunchError::io(format!("can't read directory {}", path.display()), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IGNORED_ENTRIES;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn ignores_top_level_entries_only() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("main.nf"), "workflow {}");
        write(&src.path().join("work/abc/.command.sh"), "echo");
        write(&src.path().join("results/report.html"), "<html>");
        write(&src.path().join("modules/work"), "a file called work");
        write(&src.path().join("modules/results/keep.txt"), "nested");

        let copied = copy_tree(src.path(), dst.path(), &IGNORED_ENTRIES).unwrap();

        assert_eq!(copied, 3);
        assert!(dst.path().join("main.nf").exists());
        assert!(!dst.path().join("work").exists());
        assert!(!dst.path().join("results").exists());
        assert_eq!(fs::read_to_string(dst.path().join("modules/work")).unwrap(), "a file called work");
        assert!(dst.path().join("modules/results/keep.txt").exists());
    }

    #[test]
    fn overlays_existing_destination() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("nextflow.config"), "new");
        write(&dst.path().join("nextflow.config"), "old");
        write(&dst.path().join("leftover.txt"), "kept");

        copy_tree(src.path(), dst.path(), &IGNORED_ENTRIES).unwrap();
        copy_tree(src.path(), dst.path(), &IGNORED_ENTRIES).unwrap();

        assert_eq!(fs::read_to_string(dst.path().join("nextflow.config")).unwrap(), "new");
        assert!(dst.path().join("leftover.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_are_preserved() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/does/not/exist", src.path().join("broken")).unwrap();
        write(&src.path().join("assets/schema.json"), "{}");
        std::os::unix::fs::symlink("assets/schema.json", src.path().join("schema.json")).unwrap();

        copy_tree(src.path(), dst.path(), &IGNORED_ENTRIES).unwrap();

        let broken = dst.path().join("broken");
        assert!(is_symlink(&broken));
        assert_eq!(fs::read_link(&broken).unwrap(), Path::new("/does/not/exist"));
        let link = dst.path().join("schema.json");
        assert!(is_symlink(&link));
        assert_eq!(fs::read_to_string(link).unwrap(), "{}");
    }

    #[cfg(unix)]
    #[test]
    fn directory_replaces_stale_link() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        write(&src.path().join("assets/a.txt"), "asset");
        std::os::unix::fs::symlink(outside.path(), dst.path().join("assets")).unwrap();

        copy_tree(src.path(), dst.path(), &IGNORED_ENTRIES).unwrap();

        let assets = dst.path().join("assets");
        assert!(!is_symlink(&assets));
        assert_eq!(fs::read_to_string(assets.join("a.txt")).unwrap(), "asset");
        assert!(!outside.path().join("a.txt").exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let dst = tempfile::tempdir().unwrap();
        let err = copy_tree(&dst.path().join("nope"), dst.path(), &IGNORED_ENTRIES).unwrap_err();
        assert!(matches!(err, LaunchError::Io { .. }));
    }
}
