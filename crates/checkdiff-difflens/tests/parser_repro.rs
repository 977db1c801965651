use checkdiff_core::LineRange;
use checkdiff_difflens::parser::parse_diff;
use checkdiff_difflens::select::{select_hunks, HunkSelection};

#[test]
fn parse_patch_without_git_header() {
    let diff = "\
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -0,0 +1,3 @@
+fn main() {
+    println!(\"hello\");
+}
";
    let diff = parse_diff(diff).unwrap();
    assert_eq!(diff.hunks.len(), 1);
    assert_eq!(diff.hunks[0].removed, LineRange { start: 0, count: 0 });
    assert_eq!(diff.added_total, 3);
}

#[test]
fn git_u0_output_with_section_headings() {
    let diff = "\
diff --git a/server/handler.go b/server/handler.go
index 3b18e51..a9c1f02 100644
--- a/server/handler.go
+++ b/server/handler.go
@@ -12 +12 @@ import (
-\t\"log\"
+\t\"log/slog\"
@@ -40,3 +40,0 @@ func (h *Handler) ServeHTTP(w http.ResponseWriter, r *http.Request) {
-\tif r == nil {
-\t\treturn
-\t}
@@ -88,0 +86,2 @@ func (h *Handler) Close() error {
+\th.wg.Wait()
+\treturn nil
";
    let diff = parse_diff(diff).unwrap();
    assert_eq!(diff.hunks.len(), 3);
    assert_eq!(diff.removed_total, 4);
    assert_eq!(diff.added_total, 3);

    let picked = select_hunks(diff, Some(&"2".parse::<HunkSelection>().unwrap()));
    assert_eq!(picked.hunks.len(), 1);
    assert_eq!(picked.removed_total, 3);
    assert_eq!(picked.added_total, 0);
    assert!(picked.hunks[0].raw_text.starts_with("@@ -40,3 +40,0 @@"));
}
