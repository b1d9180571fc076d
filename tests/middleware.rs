use axum::http::{header, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use web_utils::db::{connect, run};
use web_utils::router::{routes, RequestData, Router};
use web_utils::sql::Identifiable;
use web_utils::{case_path, route, ApiError, Conn, CrudFunctions, DatabaseCrud, JsonFormat, StatusLineOpen};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: i64,
    description: String,
}

impl Identifiable for Todo {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct NewTodo {
    description: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Api {
    Delete(i64),
    FetchAll,
    Fetch(i64),
    Insert(NewTodo),
    Update(Todo),
}

fn api() -> Router<Api> {
    routes([
        Router::delete()
            .path("todos")
            .path_param::<i64>()
            .case(case_path!(Api::Delete(id)))
            .end(),
        Router::get().path("todos").case(case_path!(Api::FetchAll)).end(),
        Router::get()
            .path("todos")
            .path_param::<i64>()
            .case(case_path!(Api::Fetch(id)))
            .end(),
        Router::post()
            .path("todos")
            .json_body::<NewTodo>()
            .case(case_path!(Api::Insert(todo)))
            .end(),
        Router::put()
            .path("todos")
            .json_body::<Todo>()
            .case(case_path!(Api::Update(todo)))
            .end(),
    ])
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("web_utils=debug"))
        .with_test_writer()
        .try_init();
}

async fn app() -> axum::Router {
    init_tracing();
    let db = connect("sqlite::memory:").await.unwrap();
    run(
        &db,
        "CREATE TABLE todos (id INTEGER PRIMARY KEY AUTOINCREMENT, description TEXT NOT NULL)",
    )
    .await
    .unwrap();
    let todos: CrudFunctions<i64, Todo, NewTodo> = DatabaseCrud::new("todos", db).functions();

    route(api(), move |conn: Conn<StatusLineOpen, Api>| {
        let todos = todos.clone();
        async move {
            let format = JsonFormat::Testing;
            let request = conn.data().clone();
            match request {
                Api::Delete(id) => conn.respond_json_unit((todos.delete)(id), format).await,
                Api::FetchAll => conn.respond_json_result((todos.fetch_all)(), format).await,
                Api::Fetch(id) => conn.respond_json_result((todos.fetch_id)(id), format).await,
                Api::Insert(todo) => conn.respond_json_result((todos.insert)(todo), format).await,
                Api::Update(todo) => conn.respond_json_result((todos.update)(todo), format).await,
            }
        }
    })
}

struct Reply {
    status: StatusCode,
    content_type: String,
    content_length: Option<String>,
    body: String,
}

async fn send(app: &axum::Router, request: RequestData) -> Reply {
    let response = app
        .clone()
        .oneshot(request.into_request().unwrap())
        .await
        .unwrap();
    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    let status = response.status();
    let content_type = header_value(header::CONTENT_TYPE).unwrap_or_default();
    let content_length = header_value(header::CONTENT_LENGTH);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        content_type,
        content_length,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}

async fn call(app: &axum::Router, route: Api) -> Reply {
    send(app, api().request_for(&route).unwrap()).await
}

fn new_todo(description: &str) -> Api {
    Api::Insert(NewTodo {
        description: description.into(),
    })
}

#[tokio::test]
async fn insert_then_fetch_all() {
    let app = app().await;

    let reply = call(&app, new_todo("first")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type, "application/json");
    assert_eq!(reply.body, "{\n  \"description\": \"first\",\n  \"id\": 1\n}");
    call(&app, new_todo("second")).await;

    let reply = call(&app, Api::FetchAll).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        r#"[
  {
    "description": "first",
    "id": 1
  },
  {
    "description": "second",
    "id": 2
  }
]"#
    );
    assert_eq!(reply.content_length, Some(reply.body.len().to_string()));
}

#[tokio::test]
async fn delete_is_an_empty_object() {
    let app = app().await;
    call(&app, new_todo("first")).await;

    let reply = call(&app, Api::Delete(1)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "{}");
    assert_eq!(reply.content_length.as_deref(), Some("2"));

    let reply = call(&app, Api::FetchAll).await;
    assert_eq!(reply.body, "[]");
}

#[tokio::test]
async fn update_returns_the_changed_row() {
    let app = app().await;
    call(&app, new_todo("first")).await;

    let changed = Todo {
        id: 1,
        description: "changed".into(),
    };
    let reply = call(&app, Api::Update(changed.clone())).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Todo>(&reply.body).unwrap(), changed);
}

#[tokio::test]
async fn missing_row_is_a_500_api_error() {
    let app = app().await;

    let reply = call(&app, Api::Fetch(42)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.content_type, "application/json");
    let error: ApiError = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(error.message, "fetch_id: \"todos\" : 42");
    assert!(error.file.ends_with("middleware.rs"));
    assert!(error.error_dump.contains("RequireSome"));
}

#[tokio::test]
async fn unmatched_requests_are_404() {
    let app = app().await;

    let reply = send(&app, RequestData::new(Method::GET, "nowhere")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, "Not Found");

    let reply = send(&app, RequestData::new(Method::POST, "todos").with_body("{")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
