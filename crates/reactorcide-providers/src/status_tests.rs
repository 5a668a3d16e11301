use super::*;
use crate::GenericStatusState::*;

#[test]
fn github_mapping_matches_table() {
    assert_eq!(to_github(Pending), "pending");
    assert_eq!(to_github(Running), "pending");
    assert_eq!(to_github(Success), "success");
    assert_eq!(to_github(Failure), "failure");
    assert_eq!(to_github(Error), "error");
    assert_eq!(to_github(Cancelled), "error");
}

#[test]
fn gitlab_mapping_matches_table() {
    assert_eq!(to_gitlab(Pending), "pending");
    assert_eq!(to_gitlab(Running), "running");
    assert_eq!(to_gitlab(Success), "success");
    assert_eq!(to_gitlab(Failure), "failed");
    assert_eq!(to_gitlab(Error), "failed");
    assert_eq!(to_gitlab(Cancelled), "canceled");
}
