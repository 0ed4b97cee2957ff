// tests/walk.rs

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use htmlsplice::build::collect_sources;
use htmlsplice::fs::mock::MockFileSystem;
use htmlsplice::fs::{DirEntry, EntryKind, FileSystem, RealFileSystem};

#[test]
fn collects_css_and_js_in_lexical_depth_first_order() {
    let fs = MockFileSystem::new();
    fs.add_file("web/b.css", "B{}");
    fs.add_file("web/a.css", "A{}");
    fs.add_file("web/sub/c.css", "C{}");
    fs.add_file("web/z.js", "z();");
    fs.add_file("web/sub/y.js", "y();");
    fs.add_file("web/notes.md", "ignored");

    let bundle = collect_sources(&fs, Path::new("web")).unwrap();
    assert_eq!(bundle.css, "A{}B{}C{}");
    assert_eq!(bundle.javascript, "y();z();");
    assert_eq!(bundle.files, 5);
}

#[test]
fn extension_match_is_case_insensitive() {
    let fs = MockFileSystem::new();
    fs.add_file("web/Main.CSS", "m{}");
    fs.add_file("web/App.Js", "app();");

    let bundle = collect_sources(&fs, Path::new("web")).unwrap();
    assert_eq!(bundle.css, "m{}");
    assert_eq!(bundle.javascript, "app();");
}

#[test]
fn empty_directory_yields_empty_bundle() {
    let fs = MockFileSystem::new();
    fs.add_file("web/readme.txt", "nothing to see");

    let bundle = collect_sources(&fs, Path::new("web")).unwrap();
    assert!(bundle.css.is_empty());
    assert!(bundle.javascript.is_empty());
    assert_eq!(bundle.files, 0);
}

#[test]
fn mock_listing_reports_directories() {
    let fs = MockFileSystem::new();
    fs.add_file("web/sub/a.css", "a{}");
    fs.add_file("web/b.js", "b();");

    let mut listed = fs.list_dir(Path::new("web")).unwrap();
    listed.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(
        listed,
        vec![
            DirEntry {
                path: PathBuf::from("web/b.js"),
                kind: EntryKind::File
            },
            DirEntry {
                path: PathBuf::from("web/sub"),
                kind: EntryKind::Dir
            },
        ]
    );
}

#[test]
fn missing_root_is_an_error() {
    let fs = MockFileSystem::new();
    assert!(collect_sources(&fs, Path::new("absent")).is_err());
}

/// Lists a file that is gone by the time it is read.
#[derive(Debug)]
struct VanishingFs {
    inner: MockFileSystem,
    ghost: PathBuf,
}

impl FileSystem for VanishingFs {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        if path == self.ghost {
            return Err(anyhow!("No such file: {:?}", path));
        }
        self.inner.open_read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path != self.ghost && self.inner.exists(path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = self.inner.list_dir(dir)?;
        if dir == Path::new("web") {
            entries.push(DirEntry {
                path: self.ghost.clone(),
                kind: EntryKind::File,
            });
        }
        Ok(entries)
    }
}

#[test]
fn file_vanishing_mid_walk_is_skipped() {
    let inner = MockFileSystem::new();
    inner.add_file("web/a.css", "a{}");
    let fs = VanishingFs {
        inner,
        ghost: PathBuf::from("web/gone.css"),
    };

    let bundle = collect_sources(&fs, Path::new("web")).unwrap();
    assert_eq!(bundle.css, "a{}");
    assert_eq!(bundle.files, 1);
}

#[test]
fn unreadable_existing_file_fails_the_walk() {
    #[derive(Debug)]
    struct Broken(MockFileSystem);

    impl FileSystem for Broken {
        fn read_to_string(&self, path: &Path) -> Result<String> {
            self.0.read_to_string(path)
        }
        fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
            Err(anyhow!("permission denied: {:?}", path))
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.exists(path)
        }
        fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
            self.0.list_dir(dir)
        }
    }

    let inner = MockFileSystem::new();
    inner.add_file("web/a.css", "a{}");
    assert!(collect_sources(&Broken(inner), Path::new("web")).is_err());
}

#[cfg(unix)]
#[test]
fn directory_symlink_cycle_is_not_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("web");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    std::fs::write(root.join("a.css"), "a{}").unwrap();
    std::fs::write(root.join("sub/b.js"), "b();").unwrap();
    symlink(&root, root.join("sub/loop")).unwrap();

    let bundle = collect_sources(&RealFileSystem, &root).unwrap();
    assert_eq!(bundle.css, "a{}");
    assert_eq!(bundle.javascript, "b();");
    assert_eq!(bundle.files, 2);
}

#[cfg(unix)]
#[test]
fn symlinked_source_file_is_read() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let shared = dir.path().join("shared.css");
    std::fs::write(&shared, "shared{}").unwrap();
    let root = dir.path().join("web");
    std::fs::create_dir_all(&root).unwrap();
    symlink(&shared, root.join("linked.css")).unwrap();

    let bundle = collect_sources(&RealFileSystem, &root).unwrap();
    assert_eq!(bundle.css, "shared{}");
}
