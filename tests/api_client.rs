use mockmate_lib::api::{ApiClient, ApiError, NextQuestion, QuestionType};
use mockmate_lib::api::questions::QuestionFilter;
use mockmate_lib::session::{Credential, CredentialHub, Profile, Role, SessionManager};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn profile() -> Profile {
    Profile {
        id: 3,
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: Role::User,
    }
}

fn signed_in(server: &MockServer, token: &str) -> (ApiClient, SessionManager) {
    let hub = CredentialHub::in_memory();
    let session = SessionManager::attach(&hub);
    session
        .set_credential(Credential::new(token, profile()).unwrap())
        .unwrap();
    let client = ApiClient::new(&server.uri(), session.clone()).unwrap();
    (client, session)
}

fn question_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "question": "Explain a hash map",
        "type": "TECHNICAL",
        "domain": "DSA",
        "jobRole": "Backend Engineer",
        "hints": "Think about buckets",
        "difficulty": 2,
        "timeLimitSeconds": 90
    })
}

#[tokio::test]
async fn test_authorized_call_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interviews/my-interviews"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "jobRole": "SRE", "domain": "DSA", "status": "COMPLETED", "overallScore": 71.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _session) = signed_in(&server, "tok-1");
    let interviews = client.my_interviews().await.unwrap();
    assert_eq!(interviews.len(), 1);
    assert_eq!(interviews[0].score_label(), "71.0/100");
}

#[tokio::test]
async fn test_login_sends_no_bearer_and_returns_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh",
            "type": "Bearer",
            "id": 3,
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "ADMIN"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // A stale credential must not leak into the login request.
    let (client, _session) = signed_in(&server, "stale");
    let credential = client.login(" ada@example.com ", "secret").await.unwrap();
    assert_eq!(credential.token(), "fresh");
    assert_eq!(credential.profile().role, Role::Admin);

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let server = MockServer::start().await;
    let (client, _session) = signed_in(&server, "tok");
    let err = client.login("", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analytics/my-analytics"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Error: token expired"))
        .mount(&server)
        .await;

    let (client, session) = signed_in(&server, "expired");
    let err = client.my_analytics().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Unauthorized {
            status: 401,
            message: "token expired".to_string()
        }
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_newer_sign_in_survives_late_rejection() {
    let server = MockServer::start().await;
    let hub = CredentialHub::in_memory();
    let session = SessionManager::attach(&hub);
    let other_tab = SessionManager::attach(&hub);
    session
        .set_credential(Credential::new("old", profile()).unwrap())
        .unwrap();

    let relogin = other_tab.clone();
    Mock::given(method("GET"))
        .and(path("/interviews/my-interviews"))
        .respond_with(move |_: &Request| {
            // The other tab signs in again while this request is in flight.
            relogin
                .set_credential(Credential::new("new", profile()).unwrap())
                .unwrap();
            ResponseTemplate::new(403)
        })
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), session.clone()).unwrap();
    let err = client.my_interviews().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(session.credential().unwrap().token(), "new");
}

#[tokio::test]
async fn test_error_message_is_taken_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/interviews/start"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Error: Unknown domain"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interviews/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, session) = signed_in(&server, "tok");
    let request = mockmate_lib::api::StartInterviewRequest::new("SRE", "Astrology");
    let err = client.start_interview(&request).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            message: "Unknown domain".to_string()
        }
    );
    assert!(!err.is_transient());

    let err = client.get_interview(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: Not Found");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_next_question_reads_question_or_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interviews/5/next-question"))
        .respond_with(ResponseTemplate::new(200).set_body_json(question_json(11)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interviews/6/next-question"))
        .respond_with(ResponseTemplate::new(200).set_body_string("All questions completed"))
        .mount(&server)
        .await;

    let (client, _session) = signed_in(&server, "tok");
    match client.next_question(5).await.unwrap() {
        NextQuestion::Question(question) => {
            assert_eq!(question.id, 11);
            assert_eq!(question.question_type, Some(QuestionType::Technical));
            assert_eq!(question.time_limit(), 90);
            assert_eq!(question.hint(), Some("Think about buckets"));
        }
        NextQuestion::Exhausted => panic!("expected a question"),
    }
    assert_eq!(client.next_question(6).await.unwrap(), NextQuestion::Exhausted);
}

#[tokio::test]
async fn test_question_filters_hit_public_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/questions/public/domain/System%20Design/role/SRE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([question_json(1)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/questions/public/difficulty/DSA/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _session) = signed_in(&server, "tok");
    let found = client
        .list_questions(&QuestionFilter::DomainAndRole {
            domain: "System Design".to_string(),
            job_role: "SRE".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let none = client.questions_by_difficulty("DSA", 3).await.unwrap();
    assert!(none.is_empty());

    let err = client.questions_by_difficulty("DSA", 9).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_submit_answer_body_is_camel_case() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/interviews/4/submit-answer"))
        .and(header_exists("Authorization"))
        .and(body_json(json!({
            "questionId": 11,
            "answerText": "Buckets and a hash function",
            "timeTakenSeconds": 25
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _session) = signed_in(&server, "tok");
    let submission = mockmate_lib::interview::AnswerSubmission::new(
        11,
        "Buckets and a hash function",
        60,
        35,
    )
    .unwrap();
    client.submit_answer(4, &submission).await.unwrap();
}
