use super::*;

#[test]
fn strips_https_and_git_suffix() {
    assert_eq!(canonicalize("https://github.com/org/repo.git"), "github.com/org/repo");
}

#[test]
fn strips_ssh_prefix() {
    assert_eq!(canonicalize("ssh://github.com/org/repo"), "github.com/org/repo");
}

#[test]
fn rewrites_scp_style_git_url() {
    assert_eq!(canonicalize("git@github.com:org/repo.git"), "github.com/org/repo");
}

#[test]
fn rewrites_raw_githubusercontent_host() {
    assert_eq!(
        canonicalize("https://raw.githubusercontent.com/org/repo/main/file"),
        "github.com/org/repo/main/file"
    );
}

#[test]
fn strips_trailing_slash() {
    assert_eq!(canonicalize("https://github.com/org/repo/"), "github.com/org/repo");
}

#[test]
fn empty_input_is_empty() {
    assert_eq!(canonicalize(""), "");
    assert_eq!(canonicalize("   "), "");
}

#[test]
fn is_idempotent_for_all_known_forms() {
    let inputs = [
        "https://github.com/org/repo.git",
        "ssh://git@github.com/org/repo.git",
        "git@github.com:org/repo.git",
        "https://raw.githubusercontent.com/org/repo/",
        "github.com/org/repo",
    ];
    for input in inputs {
        let once = canonicalize(input);
        let twice = canonicalize(&once);
        assert_eq!(once, twice, "not idempotent for {input}");
    }
}

#[test]
fn match_true_for_same_repo_different_forms() {
    assert!(matches(
        "git@github.com:org/repo.git",
        "https://github.com/org/repo"
    ));
}

#[test]
fn match_false_for_different_org_or_repo() {
    assert!(!matches(
        "https://github.com/org/repo",
        "https://github.com/org/other"
    ));
    assert!(!matches(
        "https://github.com/org/repo",
        "https://github.com/other-org/repo"
    ));
}
