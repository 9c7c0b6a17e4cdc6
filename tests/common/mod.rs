#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const FORMATTED_MARKER: &str = "/* formatted */";

// Records cwd and argv per call, appends a marker to every file it is given,
// and fails (before touching anything) on call number $FAKE_FMT_FAIL_ON.
const FAKE_FORMATTER: &str = r#"#!/bin/sh
log="$FAKE_FMT_LOG"
n=$(( $(cat "$log.count" 2>/dev/null || echo 0) + 1 ))
echo "$n" > "$log.count"
printf 'cwd=%s\n' "$(pwd -P)" >> "$log"
for a in "$@"; do printf 'arg=%s\n' "$a" >> "$log"; done
printf 'end\n' >> "$log"
if [ -n "$FAKE_FMT_FAIL_ON" ] && [ "$n" = "$FAKE_FMT_FAIL_ON" ]; then
    echo "fake failure on batch $n" >&2
    exit 3
fi
for a in "$@"; do
    if [ "$a" != "-i" ]; then printf '/* formatted */\n' >> "$a"; fi
done
"#;

pub fn git(root: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(root)
        .status()
        .expect("spawn git");
    assert!(status.success(), "git {args:?} failed");
}

pub fn init_repo(root: &Path) {
    git(root, &["-c", "init.defaultBranch=main", "init"]);
}

pub fn commit_all(root: &Path, message: &str) {
    git(root, &["add", "."]);
    git(
        root,
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-m",
            message,
        ],
    );
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// One recorded formatter call.
#[derive(Debug)]
pub struct Invocation {
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

/// The fake formatter plus where it writes its log; lives outside the repo.
pub struct FakeFormatter {
    _dir: tempfile::TempDir,
    pub script: PathBuf,
    pub log: PathBuf,
}

impl FakeFormatter {
    #[cfg(unix)]
    pub fn new() -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-clang-format");
        fs::write(&script, FAKE_FORMATTER).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let log = dir.path().join("calls.log");
        Self {
            _dir: dir,
            script,
            log,
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        let Ok(text) = fs::read_to_string(&self.log) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cwd = PathBuf::new();
        let mut args = Vec::new();
        for line in text.lines() {
            if let Some(c) = line.strip_prefix("cwd=") {
                cwd = PathBuf::from(c);
            } else if let Some(a) = line.strip_prefix("arg=") {
                args.push(a.to_string());
            } else if line == "end" {
                out.push(Invocation {
                    cwd: std::mem::take(&mut cwd),
                    args: std::mem::take(&mut args),
                });
            }
        }
        out
    }

    /// Runs the binary in `cwd` with this formatter wired in.
    pub fn run(&self, cwd: &Path, args: &[&str], fail_on: Option<usize>) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_git-clang-format"));
        // formatter first: flag parsing ends at the first path scope
        cmd.arg("--clang-format")
            .arg(&self.script)
            .args(args)
            .env("FAKE_FMT_LOG", &self.log)
            .env_remove("GIT_CLANG_FORMAT_BATCH_SIZE")
            .current_dir(cwd);
        match fail_on {
            Some(n) => cmd.env("FAKE_FMT_FAIL_ON", n.to_string()),
            None => cmd.env_remove("FAKE_FMT_FAIL_ON"),
        };
        cmd.output().expect("run git-clang-format")
    }
}

pub fn is_formatted(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|s| s.contains(FORMATTED_MARKER))
        .unwrap_or(false)
}
