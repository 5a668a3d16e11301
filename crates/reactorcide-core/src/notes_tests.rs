use super::*;

fn sample() -> JobNotes {
    JobNotes {
        vcs_provider: "github".to_string(),
        repo: "org/repo".to_string(),
        pr_number: Some(42),
        branch: None,
        commit_sha: "abc1234".to_string(),
        status_context: "reactorcide/eval".to_string(),
        is_eval: true,
    }
}

#[test]
fn round_trips_through_blob() {
    let notes = sample();
    let blob = notes.to_blob();
    let parsed = JobNotes::from_blob(&blob).unwrap();
    assert_eq!(parsed.repo, "org/repo");
    assert_eq!(parsed.pr_number, Some(42));
    assert!(parsed.is_eval);
}

#[test]
fn malformed_blob_is_none_not_error() {
    assert!(JobNotes::from_blob("not json").is_none());
    assert!(JobNotes::from_blob("").is_none());
    assert!(JobNotes::from_blob("{}").is_none());
}
