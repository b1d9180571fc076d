//! Example consumer: a todo server using web-utils routes, CRUD functions and JSON responses.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use web_utils::db::{run, DatabaseConfig};
use web_utils::router::{routes, Router};
use web_utils::sql::Identifiable;
use web_utils::{case_path, route, Conn, CrudFunctions, DatabaseCrud, JsonFormat, StatusLineOpen};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL
)";

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Serialize, Deserialize)]
struct NewTodo {
    description: String,
}

#[derive(Clone, Debug)]
enum TodoRoute {
    List,
    Show(i64),
    Create(NewTodo),
    Update(Todo),
    Delete(i64),
}

fn todo_router() -> Router<TodoRoute> {
    routes([
        Router::get().path("todos").case(case_path!(TodoRoute::List)).end(),
        Router::get()
            .path("todos")
            .path_param::<i64>()
            .case(case_path!(TodoRoute::Show(id)))
            .end(),
        Router::post()
            .path("todos")
            .json_body::<NewTodo>()
            .case(case_path!(TodoRoute::Create(todo)))
            .end(),
        Router::put()
            .path("todos")
            .json_body::<Todo>()
            .case(case_path!(TodoRoute::Update(todo)))
            .end(),
        Router::delete()
            .path("todos")
            .path_param::<i64>()
            .case(case_path!(TodoRoute::Delete(id)))
            .end(),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("web_utils=info,example_consumer=info")
            }),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let db = DatabaseConfig::new(database_url).connect().await?;
    run(&db, SCHEMA).await?;

    let todos: CrudFunctions<i64, Todo, NewTodo> = DatabaseCrud::new("todos", db).functions();
    let app = route(todo_router(), move |conn: Conn<StatusLineOpen, TodoRoute>| {
        let todos = todos.clone();
        async move {
            let format = JsonFormat::Compact;
            let request = conn.data().clone();
            match request {
                TodoRoute::List => conn.respond_json_result((todos.fetch_all)(), format).await,
                TodoRoute::Show(id) => conn.respond_json_result((todos.fetch_id)(id), format).await,
                TodoRoute::Create(todo) => conn.respond_json_result((todos.insert)(todo), format).await,
                TodoRoute::Update(todo) => conn.respond_json_result((todos.update)(todo), format).await,
                TodoRoute::Delete(id) => conn.respond_json_unit((todos.delete)(id), format).await,
            }
        }
    })
    .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = TcpListener::bind(&bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Example consumer listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
