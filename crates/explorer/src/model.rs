use serde::{Deserialize, Serialize};

/// A repository as kept in the explorer list.
///
/// `full_name` (`owner/name`) is the unique key of an entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub full_name: String,
    pub description: Option<String>,
    pub owner: Owner,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub login: String,
    pub avatar_url: String,
}

/// The repository fields shown on the detail page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct RepositoryDetails {
    pub full_name: String,
    pub description: Option<String>,
    pub owner: Owner,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub html_url: String,
    pub user: IssueAuthor,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct IssueAuthor {
    pub login: String,
}
