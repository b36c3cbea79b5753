//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the remote API and run the full
//! harvest cycle end-to-end: walls, question filter, comments, CSV export.

use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wall_harvester::config::{apply_env_overrides, parse_config, validate};
use wall_harvester::harvest::HarvestSettings;
use wall_harvester::output::write_report;
use wall_harvester::{
    ApiClient, Harvester, HeuristicPredictor, LikeLookup, PostLimit, RetryPolicy, Sex,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// 2024-06-01 12:00:00 UTC
const JUNE_FIRST: i64 = 1_717_243_200;

fn api_url(server: &MockServer) -> String {
    format!("{}/method/", server.uri())
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&api_url(server), "test-token", "5.131", RetryPolicy::default())
        .expect("Failed to build client")
}

fn settings() -> HarvestSettings {
    HarvestSettings {
        limit: PostLimit::Count(10),
        page_delay: Duration::from_millis(1),
        ..HarvestSettings::default()
    }
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": body }))
}

/// Mounts a two-group API: `apiclub` resolves to id 1, `ghost` does not resolve
async fn mount_groups(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("domain", "apiclub"))
        .respond_with(ok(serde_json::json!({
            "count": 3,
            "items": [
                {"id": 101, "text": "How do I renew my pass?", "date": JUNE_FIRST, "likes": {"count": 4}},
                {"id": 102, "text": "Office closed on Monday", "date": JUNE_FIRST, "likes": {"count": 9}},
                {"id": 103, "text": "Can anyone recommend a dentist", "date": JUNE_FIRST}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("domain", "ghost"))
        .respond_with(ok(serde_json::json!({
            "count": 1,
            "items": [{"id": 7, "text": "Where is everyone?", "date": JUNE_FIRST}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .and(query_param("group_id", "apiclub"))
        .respond_with(ok(serde_json::json!([{"id": 1, "screen_name": "apiclub"}])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .and(query_param("group_id", "ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"error_code": 100, "error_msg": "Invalid group id"}
        })))
        .mount(server)
        .await;
}

async fn mount_comments(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .and(query_param("owner_id", "-1"))
        .and(query_param("post_id", "101"))
        .and(query_param("extended", "1"))
        .respond_with(ok(serde_json::json!({
            "count": 2,
            "items": [
                {"id": 501, "from_id": 77, "text": "At the front desk", "date": JUNE_FIRST + 60},
                {"id": 502, "from_id": 99, "text": "Online, I think", "date": 0}
            ],
            "profiles": [{
                "id": 77,
                "first_name": "Anna",
                "last_name": "Ivanova",
                "sex": 1,
                "bdate": "5.3.1990",
                "occupation": {"type": "work", "name": "City Hospital"},
                "city": {"id": 1, "title": "Moscow"},
                "country": {"id": 1, "title": "Russia"}
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .and(query_param("owner_id", "-1"))
        .and(query_param("post_id", "103"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": [], "profiles": []})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_likes(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/method/likes.getList"))
        .and(query_param("item_id", "501"))
        .respond_with(ok(serde_json::json!({"count": 3, "items": [1, 2, 3]})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/likes.getList"))
        .and(query_param("item_id", "502"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": []})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_two_groups() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    mount_comments(&server).await;
    mount_likes(&server).await;

    let groups = vec!["apiclub".to_string(), "ghost".to_string()];
    let mut harvester = Harvester::new(client_for(&server), settings());
    let report = harvester.run(&groups, &HeuristicPredictor::default()).await;

    assert_eq!(report.groups, 2);
    assert_eq!(report.posts.len(), 4);

    // Group order then wall order
    let ids: Vec<i64> = report.posts.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![101, 102, 103, 7]);
    assert_eq!(report.posts[0].date, "01-06-2024 15:00:00");
    assert_eq!(report.posts[0].likes, 4);
    assert_eq!(report.posts[2].likes, 0);

    let questions: Vec<i64> = report.questions.iter().map(|p| p.post_id).collect();
    assert_eq!(questions, vec![101, 103, 7]);

    // The unresolved group contributes posts but no comments
    assert_eq!(report.comments.len(), 2);
    assert!(report.comments.iter().all(|c| c.group_id == "apiclub"));
    assert!(report.is_consistent());

    let anna = &report.comments[0];
    assert_eq!(anna.comment_id, Some(501));
    assert_eq!(anna.user_name, "Anna Ivanova");
    assert_eq!(anna.date, "01-06-2024 15:01:00");
    assert_eq!(anna.workplace.as_deref(), Some("City Hospital"));
    assert_eq!(anna.sex, Sex::Female);
    assert_eq!(anna.bdate.as_deref(), Some("05-03-1990"));
    assert_eq!(anna.country.as_deref(), Some("Russia"));
    assert_eq!(anna.region.as_deref(), Some("Moscow"));
    assert_eq!(anna.likes, 3);

    // Author missing from the profiles list
    let unknown = &report.comments[1];
    assert_eq!(unknown.user_name, "Unknown");
    assert_eq!(unknown.date, "");
    assert_eq!(unknown.sex, Sex::Unknown);
    assert_eq!(unknown.workplace, None);
    assert_eq!(unknown.bdate, None);
    assert_eq!(unknown.likes, 0);

    let stats = harvester.client().stats();
    assert_eq!(stats.retries, 0);
    assert!(stats.failures >= 1);
}

#[tokio::test]
async fn test_harvest_writes_csv_files() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    mount_comments(&server).await;
    mount_likes(&server).await;

    let groups = vec!["apiclub".to_string()];
    let mut harvester = Harvester::new(client_for(&server), settings());
    let report = harvester.run(&groups, &HeuristicPredictor::default()).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let files = write_report(&report, dir.path(), "questions.csv", "comments.csv", false)
        .expect("Failed to write report");

    let posts = std::fs::read_to_string(&files.posts).unwrap();
    let lines: Vec<&str> = posts.lines().collect();
    assert_eq!(lines[0], "group_id,post_id,text,date,likes");
    assert_eq!(lines[1], "apiclub,101,How do I renew my pass?,01-06-2024 15:00:00,4");
    assert_eq!(lines.len(), 3);

    let comments = std::fs::read_to_string(&files.comments).unwrap();
    let lines: Vec<&str> = comments.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "apiclub,101,501,At the front desk,Anna Ivanova,01-06-2024 15:01:00,City Hospital,F,05-03-1990,Russia,Moscow,3"
    );
    assert_eq!(lines[2], "apiclub,101,502,\"Online, I think\",Unknown,,,,,,,0");
}

#[tokio::test]
async fn test_comments_are_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .respond_with(ok(serde_json::json!([{"id": 1}])))
        .mount(&server)
        .await;

    // 100 is the page size even when more comments are wanted
    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .and(query_param("count", "100"))
        .respond_with(ok(serde_json::json!({
            "count": 250,
            "items": [{"id": 1, "from_id": 5, "text": "first", "date": JUNE_FIRST}],
            "profiles": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/likes.getList"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": []})))
        .mount(&server)
        .await;

    let mut harvester = Harvester::new(client_for(&server), settings());
    let comments = harvester.collect_comments("apiclub", 1, 250).await;

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "first");
}

#[tokio::test]
async fn test_malformed_profile_keeps_comments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .respond_with(ok(serde_json::json!([{"id": 1}])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .respond_with(ok(serde_json::json!({
            "count": 2,
            "items": [
                {"id": 1, "from_id": 5, "text": "first", "date": JUNE_FIRST},
                {"id": 2, "from_id": 6, "text": "second", "date": JUNE_FIRST}
            ],
            "profiles": [
                {"id": 5, "first_name": "Anna", "last_name": "Ivanova"},
                {"first_name": "no id"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/likes.getList"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": []})))
        .mount(&server)
        .await;

    let mut harvester = Harvester::new(client_for(&server), settings());
    let comments = harvester.collect_comments("apiclub", 1, 100).await;

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].user_name, "Anna Ivanova");
    assert_eq!(comments[1].user_name, "Unknown");
    assert_eq!(comments[1].text, "second");
}

#[tokio::test]
async fn test_batched_likes_use_execute() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    mount_comments(&server).await;

    Mock::given(method("GET"))
        .and(path("/method/execute"))
        .respond_with(ok(serde_json::json!([
            {"count": 11, "items": []},
            {"count": 2, "items": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/likes.getList"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let settings = HarvestSettings {
        likes: LikeLookup::batched(),
        ..settings()
    };
    let mut harvester = Harvester::new(client_for(&server), settings);
    let report = harvester
        .run(&["apiclub".to_string()], &HeuristicPredictor::default())
        .await;

    let likes: Vec<u64> = report.comments.iter().map(|c| c.likes).collect();
    assert_eq!(likes, vec![11, 2]);
}

#[tokio::test]
async fn test_rate_limited_wall_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"error_code": 6, "error_msg": "Too many requests per second"}
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ok(serde_json::json!({
            "count": 1,
            "items": [{"id": 1, "text": "Office closed", "date": JUNE_FIRST}]
        })))
        .mount(&server)
        .await;

    let policy = RetryPolicy {
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        ..RetryPolicy::default()
    };
    let client = ApiClient::new(&api_url(&server), "t", "5.131", policy).unwrap();
    let mut harvester = Harvester::new(client, settings());
    let report = harvester
        .run(&["apiclub".to_string()], &HeuristicPredictor::default())
        .await;

    assert_eq!(report.posts.len(), 1);
    assert!(report.questions.is_empty());
    assert!(report.comments.is_empty());

    let stats = harvester.client().stats();
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.requests, 3);
}

#[tokio::test]
async fn test_config_file_drives_cutoff_harvest() {
    let server = MockServer::start().await;

    // Two posts on or after the cutoff, then one before it
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("offset", "0"))
        .and(query_param("count", "100"))
        .and(query_param("access_token", "file-token"))
        .respond_with(ok(serde_json::json!({
            "count": 500,
            "items": [
                {"id": 3, "text": "Why is the lift broken?", "date": JUNE_FIRST},
                {"id": 2, "text": "Any advice on parking", "date": JUNE_FIRST - 86_400},
                {"id": 1, "text": "What about last year?", "date": JUNE_FIRST - 40 * 86_400}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .respond_with(ok(serde_json::json!([{"id": 1}])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/method/wall.getComments"))
        .respond_with(ok(serde_json::json!({"count": 0, "items": [], "profiles": []})))
        .expect(2)
        .mount(&server)
        .await;

    let content = format!(
        r#"
[api]
token = "file-token"
api-url = "{}"

[harvest]
groups = ["https://vk.com/apiclub"]
until-date = "31-05-2024"
page-delay-ms = 1
"#,
        api_url(&server)
    );
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();

    // Same steps as load_config, without the process environment
    let raw = std::fs::read_to_string(file.path()).unwrap();
    let mut config = parse_config(&raw).expect("Failed to parse config");
    apply_env_overrides(&mut config, |_| None);
    validate(&config).expect("Config should be valid");
    assert_eq!(config.harvest.groups, vec!["apiclub"]);
    let settings = config.harvest.settings().unwrap();
    assert!(matches!(settings.limit, PostLimit::Since(_)));

    let client = ApiClient::new(
        &config.api.api_url,
        config.api.token.clone(),
        config.api.version.clone(),
        config.retry.policy(),
    )
    .unwrap();
    let mut harvester = Harvester::new(client, settings);
    let report = harvester
        .run(&config.harvest.groups, &HeuristicPredictor::default())
        .await;

    let ids: Vec<i64> = report.posts.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(report.questions.len(), 2);
    assert!(report.comments.is_empty());
}
