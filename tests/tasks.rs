use actix_cors::Cors;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;
use todo_api::auth::IssuedToken;
use todo_api::models::{Task, TaskPriority, TaskStatus};
use todo_api::routes::{self, health};
use todo_api::{AppState, Config};

// Helper struct to hold auth details
struct TestUser {
    id: i32,
    token: String,
}

impl TestUser {
    fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

fn test_state() -> AppState {
    let config = Config::from_lookup(|key| match key {
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config");
    AppState::in_memory(&config)
}

async fn register_and_login_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req_register = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    if resp_register.status() != StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}",
            resp_register.status()
        ));
    }

    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let body = test::read_body(resp_login).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let issued: IssuedToken = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;

    Ok(TestUser {
        id: issued.user_id,
        token: issued.token,
    })
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let state = test_state();
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(|cfg| state.configure(cfg))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let server_handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("error body is JSON");
    assert_eq!(body["error"], "Missing token");

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.stop(false).await;
}

#[actix_rt::test]
async fn test_new_task_is_owned_by_creator_and_hidden_from_others() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .configure(|cfg| state.configure(cfg))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    let alice = register_and_login_user(&app, "alice@example.com", "alice", "pw123")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(alice.bearer())
        .set_json(&json!({ "title": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["user_id"], alice.id);
    assert_eq!(task["status"], "todo");
    assert_eq!(task["title"], "buy milk");

    let bob = register_and_login_user(&app, "bob@example.com", "bob", "pw456")
        .await
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(bob.bearer())
        .to_request();
    let bobs: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(bobs.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(alice.bearer())
        .to_request();
    let alices: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(alices.len(), 1);
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .configure(|cfg| state.configure(cfg))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;
    let user = register_and_login_user(&app, "crud@example.com", "crud_user", "Password123!")
        .await
        .unwrap();

    // Create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(user.bearer())
        .set_json(&json!({
            "title": "Write quarterly report",
            "description": "Numbers for Q3",
            "priority": TaskPriority::High,
            "status": TaskStatus::InProgress
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.status, TaskStatus::InProgress);
    assert_eq!(created.priority, Some(TaskPriority::High));

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(user.bearer())
        .set_json(&json!({ "title": "Water plants", "priority": "low" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    // Invalid create
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(user.bearer())
        .set_json(&json!({ "title": "" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    // Read
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(user.bearer())
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // List with filters
    for (query, expected) in [
        ("", 2),
        ("?status=in_progress", 1),
        ("?priority=low", 1),
        ("?search=QUARTERLY", 1),
        ("?search=q3", 1),
        ("?status=done", 0),
    ] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/tasks{}", query))
            .insert_header(user.bearer())
            .to_request();
        let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), expected, "query {:?}", query);
    }

    // Update
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(user.bearer())
        .set_json(&json!({
            "title": "Write quarterly report (final)",
            "priority": "urgent",
            "status": "done"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.title, "Write quarterly report (final)");
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.priority, Some(TaskPriority::Urgent));
    assert_eq!(updated.description, None);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.user_id, user.id);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(user.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .insert_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Task not found");
}

#[actix_rt::test]
async fn test_task_ownership_and_authorization() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .configure(|cfg| state.configure(cfg))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;
    let owner = register_and_login_user(&app, "owner@example.com", "owner", "Password123!")
        .await
        .unwrap();
    let intruder = register_and_login_user(&app, "intruder@example.com", "intruder", "Password123!")
        .await
        .unwrap();

    // A client-supplied owner is ignored.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(owner.bearer())
        .set_json(&json!({ "title": "Owner's task", "user_id": intruder.id }))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.user_id, owner.id);

    let uri = format!("/api/tasks/{}", task.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(intruder.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(intruder.bearer())
        .set_json(&json!({ "title": "Hijacked", "status": "done" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(intruder.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Nothing the intruder tried took effect.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(owner.bearer())
        .to_request();
    let unchanged: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged, task);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", uuid::Uuid::new_v4()))
        .insert_header(owner.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
