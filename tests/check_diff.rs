use std::path::Path;
use std::process::{Command, Output};

use git2::{Oid, Repository, Signature, Time};

struct Repo {
    dir: tempfile::TempDir,
    repo: Repository,
    clock: i64,
}

impl Repo {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    fn write(&self, file: &str, content: &str) {
        std::fs::write(self.dir.path().join(file), content).unwrap();
    }

    fn commit(&mut self, file: &str, content: &str) -> Oid {
        self.write(file, content);
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        self.clock += 60;
        let sig = Signature::new("Dev", "dev@example.com", &Time::new(self.clock, 0)).unwrap();
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)
            .unwrap()
    }

    fn tag(&self, name: &str, target: Oid) {
        let obj = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &obj, false).unwrap();
    }

    fn remote_branch(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/remotes/{name}"), target, true, "test")
            .unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_git-check-diff"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "git-check-diff failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

/// Two commits on `a.txt`, each tagged, with the second on `origin/develop`.
fn tagged_history() -> (Repo, Oid, Oid) {
    let mut repo = Repo::new();
    let first = repo.commit("a.txt", "one\ntwo\nthree\n");
    repo.tag("MERGE_BASE_1", first);
    let second = repo.commit("a.txt", "one\nTWO\nthree\n");
    repo.tag("MERGE_BASE_2", second);
    repo.remote_branch("origin/develop", second);
    (repo, first, second)
}

#[test]
fn single_line_change_reports_common_tag() {
    let (repo, _, second) = tagged_history();
    repo.write("a.txt", "one\n2\nthree\n");

    let out = stdout(&repo.run(&["a.txt"]));
    assert_eq!(
        out,
        format!(
            "a.txt\n    Lines: 1 removed, 1 added\n    Commits affected:\n\t{second} (origin/develop)\n    Common tag:\n\tMERGE_BASE_2\n"
        )
    );
}

#[test]
fn colored_or_external_diff_config_does_not_hide_hunks() {
    let (repo, _, second) = tagged_history();
    let mut config = repo.repo.config().unwrap();
    config.set_str("color.diff", "always").unwrap();
    config.set_str("color.ui", "always").unwrap();
    config.set_str("diff.external", "false").unwrap();
    repo.write("a.txt", "one\n2\nthree\n");

    let out = stdout(&repo.run(&["a.txt"]));
    assert!(out.contains("    Lines: 1 removed, 1 added\n"));
    assert!(out.contains(&format!("\t{second} (origin/develop)\n")));
    assert!(out.ends_with("    Common tag:\n\tMERGE_BASE_2\n"));
}

#[test]
fn before_offset_blames_the_previous_line() {
    let (repo, first, _) = tagged_history();
    repo.write("a.txt", "one\n2\nthree\n");

    let out = stdout(&repo.run(&["-B", "--line", "a.txt"]));
    assert!(out.contains(&format!("\t{first} (origin/develop)\n\tlines: 1\n")));
    assert!(out.contains("\tMERGE_BASE_1 MERGE_BASE_2\n"));
}

#[test]
fn limit_truncates_tag_list() {
    let (repo, _, _) = tagged_history();
    repo.write("a.txt", "ONE\nTWO\nthree\n");

    let out = stdout(&repo.run(&["--limit", "1", "a.txt"]));
    assert!(out.contains("\tMERGE_BASE_1 ... 1 more (use --all to show all)\n"));

    let out = stdout(&repo.run(&["--limit", "1", "--all", "a.txt"]));
    assert!(out.contains("\tMERGE_BASE_1 MERGE_BASE_2\n"));
}

#[test]
fn untagged_commit_breaks_cross_file_consensus() {
    let (mut repo, _, _) = tagged_history();
    let untagged = repo.commit("b.txt", "alpha\nbeta\n");
    repo.write("a.txt", "one\n2\nthree\n");
    repo.write("b.txt", "alpha\nBETA\n");

    let out = stdout(&repo.run(&["a.txt", "b.txt"]));
    assert!(out.contains("\tMERGE_BASE_2\n\nb.txt\n"));
    assert!(out.contains(&format!(
        "    No common tags found for all the affected commits.\n\t{untagged} ()\n\tlines: 2\n"
    )));
    assert!(out.ends_with("\n\nNO COMMON TAG\n"));
}

#[test]
fn two_files_sharing_a_tag_are_globally_common() {
    let mut repo = Repo::new();
    repo.commit("a.txt", "one\n");
    let both = repo.commit("b.txt", "alpha\n");
    repo.tag("MERGE_BASE_3", both);
    repo.write("a.txt", "ONE\n");
    repo.write("b.txt", "ALPHA\n");

    let out = stdout(&repo.run(&["a.txt", "b.txt"]));
    assert!(out.ends_with("\n\nCOMMON TAG: MERGE_BASE_3\n"));
}

#[test]
fn cached_checks_staged_changes_only() {
    let (repo, _, second) = tagged_history();
    repo.write("a.txt", "one\n2\nthree\n");
    let mut index = repo.repo.index().unwrap();
    index.add_path(Path::new("a.txt")).unwrap();
    index.write().unwrap();

    let out = stdout(&repo.run(&["a.txt"]));
    assert!(out.contains("    Lines: 0 removed, 0 added\n"));

    let out = stdout(&repo.run(&["--cached", "a.txt"]));
    assert!(out.contains(&format!("\t{second} (origin/develop)\n")));
}

#[test]
fn hunk_selection_and_hunk_text() {
    let (repo, _, _) = tagged_history();
    repo.write("a.txt", "ONE\nTWO\nTHREE\n");

    let out = stdout(&repo.run(&["-H", "2", "--hunk", "a.txt"]));
    assert!(out.contains("    Lines: 1 removed, 1 added\n@@ -3 +3 @@"));
    assert!(out.contains("\n-three\n+THREE\n"));
    assert!(!out.contains("+ONE"));
}

#[test]
fn json_output() {
    let (repo, _, second) = tagged_history();
    repo.write("a.txt", "one\n2\nthree\n");

    let out = stdout(&repo.run(&["--format", "json", "a.txt"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let file = &value["files"][0];
    assert_eq!(file["path"], "a.txt");
    assert_eq!(file["commits"][0]["id"], second.to_string());
    assert_eq!(file["commits"][0]["lines"][0], 2);
    assert_eq!(file["commonTags"][0], "MERGE_BASE_2");
}

#[test]
fn config_file_sets_display_defaults() {
    let (repo, _, _) = tagged_history();
    repo.write("a.txt", "ONE\nTWO\nthree\n");
    repo.write(
        ".checkdiff.toml",
        "[display]\nlimit = 1\nshow_lines = true\n",
    );

    let out = stdout(&repo.run(&["a.txt"]));
    assert!(out.contains("\tlines: 1\n"));
    assert!(out.contains("... 1 more (use --all to show all)"));
}

#[test]
fn no_files_is_a_usage_error() {
    let (repo, _, _) = tagged_history();
    let output = repo.run(&[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no files given"));
}

#[test]
fn hunk_selection_with_two_files_is_rejected() {
    let (repo, _, _) = tagged_history();
    let output = repo.run(&["-H", "1", "a.txt", "a.txt"]);
    assert!(!output.status.success());
}

#[test]
fn before_and_after_conflict() {
    let (repo, _, _) = tagged_history();
    let output = repo.run(&["-A", "-B", "a.txt"]);
    assert!(!output.status.success());
}

#[test]
fn invalid_tag_pattern_fails() {
    let (repo, _, _) = tagged_history();
    repo.write(".checkdiff.toml", "[tags]\npattern = \"[\"\n");
    let output = repo.run(&["a.txt"]);
    assert!(!output.status.success());
}
