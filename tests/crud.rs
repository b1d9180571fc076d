use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use web_utils::db::{connect, run};
use web_utils::sql::row::bool_from_int;
use web_utils::sql::{fetch_builder, insert_builder, Identifiable, QueryFetcher};
use web_utils::{CrudError, DatabaseCrud};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Test {
    id: i64,
    description: String,
}

impl Identifiable for Test {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Serialize)]
struct NewTest {
    description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Tag {
    slug: String,
    label: Option<String>,
}

impl Identifiable for Tag {
    type Id = String;

    fn id(&self) -> String {
        self.slug.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: i64,
    description: String,
    #[serde(deserialize_with = "bool_from_int")]
    completed: bool,
}

impl Identifiable for Todo {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Serialize)]
struct NewTodo {
    description: String,
    completed: bool,
}

async fn database() -> AnyPool {
    let db = connect("sqlite::memory:").await.unwrap();
    run(
        &db,
        "CREATE TABLE test (id INTEGER PRIMARY KEY AUTOINCREMENT, description TEXT NOT NULL);
         CREATE TABLE tag (slug TEXT PRIMARY KEY, label TEXT);
         CREATE TABLE todo (id INTEGER PRIMARY KEY AUTOINCREMENT, description TEXT NOT NULL, completed INTEGER NOT NULL DEFAULT 0);",
    )
    .await
    .unwrap();
    db
}

fn new_test(description: &str) -> NewTest {
    NewTest {
        description: description.into(),
    }
}

#[tokio::test]
async fn insert_fetch_update_delete() {
    let crud = DatabaseCrud::new("test", database().await);
    let todos = crud.functions::<i64, Test, NewTest, Test>();

    let first = (todos.insert)(new_test("blob")).await.unwrap();
    assert_eq!(
        first,
        Test {
            id: 1,
            description: "blob".into()
        }
    );
    let second = (todos.insert)(new_test("blob 2")).await.unwrap();
    assert_eq!(second.id, 2);

    let all = (todos.fetch_all)().await.unwrap();
    assert_eq!(all, vec![first.clone(), second.clone()]);

    assert_eq!((todos.fetch_id)(2).await.unwrap(), second);

    let updated = (todos.update)(Test {
        id: 1,
        description: "updated".into(),
    })
    .await
    .unwrap();
    assert_eq!(updated.description, "updated");
    assert_eq!((todos.fetch_id)(1).await.unwrap(), updated);
    assert_eq!(
        (todos.fetch_all)().await.unwrap(),
        vec![updated.clone(), second.clone()]
    );

    (todos.delete)(1).await.unwrap();
    assert_eq!((todos.fetch_all)().await.unwrap(), vec![second]);
}

#[tokio::test]
async fn missing_rows_are_require_some_errors() {
    let crud = DatabaseCrud::new("test", database().await);

    let err = crud.fetch_id::<i64, Test>()(7).await.unwrap_err();
    assert!(err.is_require_some());
    assert_eq!(err.to_string(), "fetch_id: \"test\" : 7");

    let err = crud
        .update::<Test, Test>()(Test {
            id: 5,
            description: "nobody".into(),
        })
        .await
        .unwrap_err();
    match err {
        CrudError::RequireSome(e) => assert_eq!(e.message, "update: \"test\" : 5"),
        other => panic!("unexpected {:?}", other),
    }

    // deleting a missing row is fine
    crud.delete::<i64>()(7).await.unwrap();
}

#[tokio::test]
async fn driver_errors_are_not_require_some() {
    let crud = DatabaseCrud::new("missing_table", database().await);
    let err = crud.fetch::<Test>()().await.unwrap_err();
    assert!(matches!(err, CrudError::Db(_)));
    assert!(!err.is_require_some());
}

#[tokio::test]
async fn custom_id_column_and_nulls() {
    let crud = DatabaseCrud::new("tag", database().await).with_id_column("slug");
    let tags = crud.functions::<String, Tag, Tag, Tag>();

    let rust = Tag {
        slug: "rust".into(),
        label: None,
    };
    assert_eq!((tags.insert)(rust.clone()).await.unwrap(), rust);

    let labelled = Tag {
        slug: "rust".into(),
        label: Some("Rust".into()),
    };
    assert_eq!((tags.update)(labelled.clone()).await.unwrap(), labelled);

    // updates write nulls back
    assert_eq!((tags.update)(rust.clone()).await.unwrap(), rust);
    assert_eq!((tags.fetch_id)("rust".into()).await.unwrap(), rust);

    (tags.delete)("rust".into()).await.unwrap();
    assert!((tags.fetch_all)().await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_then_select_without_returning() {
    let db = database().await;
    let affected = insert_builder(&new_test("manual"), "test")
        .unwrap()
        .run(&db)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let row = fetch_builder("test")
        .where_eq("description", "manual")
        .first::<Test>(&db)
        .await
        .unwrap();
    assert_eq!(
        row,
        Some(Test {
            id: 1,
            description: "manual".into()
        })
    );
}

#[tokio::test]
async fn integer_flags_decode_as_bool() {
    let crud = DatabaseCrud::new("todo", database().await);
    let todos = crud.functions::<i64, Todo, NewTodo, Todo>();

    let open = (todos.insert)(NewTodo {
        description: "write docs".into(),
        completed: false,
    })
    .await
    .unwrap();
    assert!(!open.completed);

    let done = (todos.insert)(NewTodo {
        description: "ship".into(),
        completed: true,
    })
    .await
    .unwrap();
    assert!(done.completed);

    let closed = (todos.update)(Todo {
        completed: true,
        ..open.clone()
    })
    .await
    .unwrap();
    assert!(closed.completed);
    assert_eq!((todos.fetch_all)().await.unwrap(), vec![closed, done]);
}
