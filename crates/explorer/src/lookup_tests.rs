use super::*;
use crate::model::Owner;

const REACT_BODY: &str = r#"{
    "id": 10270250,
    "full_name": "facebook/react",
    "description": "A library",
    "stargazers_count": 200,
    "forks_count": 40,
    "open_issues_count": 7,
    "owner": { "login": "facebook", "avatar_url": "http://x/a.png", "id": 69631 }
}"#;

fn client_for(server: &mockito::ServerGuard) -> GithubClient {
    GithubClient::new(&server.url()).unwrap()
}

#[tokio::test]
async fn when_fetching_existing_repository_it_should_return_the_record() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/facebook/react")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(REACT_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let repository = client.fetch_repository("facebook/react").await.unwrap();

    assert_eq!(
        repository,
        Repository {
            full_name: "facebook/react".to_string(),
            description: Some("A library".to_string()),
            owner: Owner {
                login: "facebook".to_string(),
                avatar_url: "http://x/a.png".to_string(),
            },
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn when_repository_has_no_description_it_should_return_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/octo/empty")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"full_name":"octo/empty","description":null,"owner":{"login":"octo","avatar_url":"http://x/o.png"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let repository = client.fetch_repository("octo/empty").await.unwrap();

    assert_eq!(repository.description, None);
}

#[tokio::test]
async fn when_repository_is_not_found_it_should_return_a_lookup_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/foo/doesnotexist")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.fetch_repository("foo/doesnotexist").await.unwrap_err();

    assert_eq!(err.identifier, "foo/doesnotexist");
}

#[tokio::test]
async fn when_server_fails_it_should_not_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/facebook/react")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Server Error"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.fetch_repository("facebook/react").await;

    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn when_response_body_is_not_a_repository_it_should_return_a_lookup_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/facebook/react")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    assert!(client.fetch_repository("facebook/react").await.is_err());
}

#[tokio::test]
async fn when_fetching_details_it_should_include_the_counters() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/facebook/react")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(REACT_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let details = client.fetch_repository_details("facebook/react").await.unwrap();

    assert_eq!(details.stargazers_count, 200);
    assert_eq!(details.forks_count, 40);
    assert_eq!(details.open_issues_count, 7);
}

#[tokio::test]
async fn when_fetching_issues_it_should_return_them_in_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/facebook/react/issues")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": 1, "title": "First", "html_url": "http://x/1", "user": {"login": "alice"}},
                {"id": 2, "title": "Second", "html_url": "http://x/2", "user": {"login": "bob"}}
            ]"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let issues = client.fetch_issues("facebook/react").await.unwrap();

    let titles: Vec<&str> = issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(issues[1].user.login, "bob");
}

#[tokio::test]
async fn when_base_uri_is_invalid_it_should_fail_to_build() {
    assert!(GithubClient::new("not a uri").is_err());
}
