// ABOUTME: Path derivation — maps a project root to Claude Code's global store entry and the local history folder.
// ABOUTME: Normalization is pure and platform-parameterized so both branches are testable anywhere.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Default name of the project-local history folder.
pub const DEFAULT_FOLDER_NAME: &str = ".claudeCodeSessions";

/// Extension of session files written by Claude Code.
pub const SESSION_EXTENSION: &str = "jsonl";

/// Which path-separator convention a project path is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Drive letters and backslash separators.
    Windows,
    /// A single root and forward-slash separators.
    Unix,
}

impl PathStyle {
    /// The convention of the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Normalize an absolute project path to the directory name Claude Code uses
/// under `~/.claude/projects/`.
///
/// `D:\Projects\MyProject` → `d--Projects-MyProject`
/// `/home/user/my-project` → `-home-user-my-project`
///
/// On Unix the leading slash becomes a dash rather than being dropped; this is
/// the naming Claude Code itself uses, so the link lands where it looks.
pub fn normalize_project_path(path: &str, style: PathStyle) -> String {
    match style {
        PathStyle::Windows => {
            let mut out = String::with_capacity(path.len());
            let drive_prefixed = path.as_bytes().get(1) == Some(&b':');
            for (i, c) in path.chars().enumerate() {
                match c {
                    '\\' | ':' => out.push('-'),
                    c if i == 0 && drive_prefixed => out.push(c.to_ascii_lowercase()),
                    c => out.push(c),
                }
            }
            out
        }
        PathStyle::Unix => path.replace('/', "-"),
    }
}

/// Resolve a user-supplied project path to the absolute form Claude Code keys
/// its store on.
///
/// An existing path is canonicalized so symlinks and `..` resolve the way the
/// shell's physical working directory does. A path that does not exist yet is
/// made absolute and collapsed lexically.
pub fn resolve_project_root(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) => Ok(strip_verbatim_prefix(canonical)),
        Err(_) => Ok(collapse_dots(&std::path::absolute(path)?)),
    }
}

/// Drop `\\?\` from a canonicalized Windows drive path; Claude Code never sees it.
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    let stripped = path
        .to_str()
        .and_then(|text| text.strip_prefix(r"\\?\"))
        .filter(|rest| rest.as_bytes().get(1) == Some(&b':'))
        .map(PathBuf::from);
    stripped.unwrap_or(path)
}

/// Remove `.` and `..` components without touching the filesystem. Also drops
/// trailing separators.
pub fn collapse_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Every location derived from a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Absolute project root.
    pub project_root: PathBuf,
    /// `<project>/<folder-name>`, where sessions live after `init`.
    pub history_dir: PathBuf,
    /// Parent of every global store entry, `<claude-home>/projects`.
    pub projects_dir: PathBuf,
    /// `<claude-home>/projects/<normalized>`, the path that becomes the link.
    pub global_entry: PathBuf,
}

impl ProjectLayout {
    /// Derive the layout from explicit inputs. `project_root` should already be absolute.
    pub fn new(project_root: &Path, claude_home: &Path, folder_name: &str, style: PathStyle) -> Self {
        let project_root = collapse_dots(project_root);
        let normalized = normalize_project_path(&project_root.to_string_lossy(), style);
        let projects_dir = claude_home.join("projects");
        Self {
            history_dir: project_root.join(folder_name),
            global_entry: projects_dir.join(normalized),
            projects_dir,
            project_root,
        }
    }

    /// Path of the project's `.git` directory.
    pub fn git_dir(&self) -> PathBuf {
        self.project_root.join(".git")
    }
}

/// Whether a path names a session file.
pub fn is_session_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SESSION_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_leading_slash_becomes_dash() {
        assert_eq!(
            normalize_project_path("/home/u/proj", PathStyle::Unix),
            "-home-u-proj"
        );
    }

    #[test]
    fn unix_preserves_case_and_existing_dashes() {
        assert_eq!(
            normalize_project_path("/Users/Foo/my-Project", PathStyle::Unix),
            "-Users-Foo-my-Project"
        );
    }

    #[test]
    fn windows_lowercases_drive_only() {
        assert_eq!(normalize_project_path("D:\\P\\X", PathStyle::Windows), "d--P-X");
        assert_eq!(
            normalize_project_path("C:\\Projects\\MyProject", PathStyle::Windows),
            "c--Projects-MyProject"
        );
    }

    #[test]
    fn windows_without_drive_is_left_as_is() {
        assert_eq!(
            normalize_project_path("\\\\server\\Share", PathStyle::Windows),
            "--server-Share"
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let a = normalize_project_path("/srv/app", PathStyle::Unix);
        let b = normalize_project_path("/srv/app", PathStyle::Unix);
        assert_eq!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn layout_derives_all_paths() {
        let layout = ProjectLayout::new(
            Path::new("/home/u/proj/"),
            Path::new("/home/u/.claude"),
            DEFAULT_FOLDER_NAME,
            PathStyle::Unix,
        );
        assert_eq!(layout.project_root, PathBuf::from("/home/u/proj"));
        assert_eq!(
            layout.history_dir,
            PathBuf::from("/home/u/proj/.claudeCodeSessions")
        );
        assert_eq!(
            layout.global_entry,
            PathBuf::from("/home/u/.claude/projects/-home-u-proj")
        );
        assert_eq!(layout.git_dir(), PathBuf::from("/home/u/proj/.git"));
    }

    #[cfg(unix)]
    #[test]
    fn layout_ignores_parent_components() {
        let dotted = ProjectLayout::new(
            Path::new("/home/u/proj/sub/../"),
            Path::new("/h"),
            DEFAULT_FOLDER_NAME,
            PathStyle::Unix,
        );
        assert_eq!(dotted.project_root, PathBuf::from("/home/u/proj"));
        assert_eq!(dotted.global_entry, PathBuf::from("/h/projects/-home-u-proj"));
    }

    #[test]
    fn collapse_dots_handles_edges() {
        assert_eq!(collapse_dots(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(collapse_dots(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(collapse_dots(Path::new("../a/..")), PathBuf::from(".."));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_project_root_matches_for_existing_and_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        fs::create_dir_all(root.join("proj").join("sub")).unwrap();

        let existing = resolve_project_root(&root.join("proj/sub/..")).unwrap();
        let missing = resolve_project_root(&root.join("proj/nope/..")).unwrap();

        assert_eq!(existing, root.join("proj"));
        assert_eq!(missing, root.join("proj"));
    }

    #[test]
    fn session_file_detection() {
        assert!(is_session_file(Path::new("a/b/abc.jsonl")));
        assert!(!is_session_file(Path::new("a/b/abc.json")));
        assert!(!is_session_file(Path::new("a/b/jsonl")));
    }
}
