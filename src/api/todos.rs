//! `/todos` resource.

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, RequestOptions};
use crate::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub todo: String,
    pub completed: bool,
    pub user_id: u64,
}

/// One page of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoListQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodoId {
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RandomLength {
    pub length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserId {
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub todo: String,
    pub completed: bool,
    pub user_id: u64,
}

/// Partial update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTodo {
    #[serde(flatten)]
    pub todo: Todo,
    pub is_deleted: bool,
    pub deleted_on: Option<String>,
}

crate::api_schema! {
    /// `/todos`
    pub Todos = "/todos" {
        Get => { query: TodoListQuery, response: TodoList },
    }

    /// `/todos/{id}`
    pub TodoById = "/todos/{id}" {
        Get => { path: TodoId, response: Todo },
        Put => { path: TodoId, body: TodoUpdate, response: Todo },
        Patch => { path: TodoId, body: TodoUpdate, response: Todo },
        Delete => { path: TodoId, response: DeletedTodo },
    }

    /// `/todos/random`
    pub TodosRandom = "/todos/random" {
        Get => { response: Todo },
    }

    /// `/todos/random/{length}`
    pub TodosRandomLength = "/todos/random/{length}" {
        Get => { path: RandomLength, response: Vec<Todo> },
    }

    /// `/todos/user/{userId}`
    pub TodosByUser = "/todos/user/{userId}" {
        Get => { path: UserId, response: TodoList },
    }

    /// `/todos/add`
    pub TodosAdd = "/todos/add" {
        Post => { body: NewTodo, response: Todo },
    }
}

pub async fn list(client: &ApiClient, query: TodoListQuery) -> ApiResult<TodoList> {
    client.get::<Todos>(&(), RequestOptions::query(query)).await
}

pub async fn get(client: &ApiClient, id: u64) -> ApiResult<Todo> {
    client
        .get::<TodoById>(&TodoId { id }, RequestOptions::default())
        .await
}

pub async fn random(client: &ApiClient) -> ApiResult<Todo> {
    client.get::<TodosRandom>(&(), RequestOptions::default()).await
}

pub async fn random_many(client: &ApiClient, length: u32) -> ApiResult<Vec<Todo>> {
    client
        .get::<TodosRandomLength>(&RandomLength { length }, RequestOptions::default())
        .await
}

pub async fn by_user(client: &ApiClient, user_id: u64) -> ApiResult<TodoList> {
    client
        .get::<TodosByUser>(&UserId { user_id }, RequestOptions::default())
        .await
}

pub async fn add(client: &ApiClient, todo: &NewTodo) -> ApiResult<Todo> {
    client
        .post::<TodosAdd>(&(), todo, RequestOptions::default())
        .await
}

pub async fn replace(client: &ApiClient, id: u64, update: &TodoUpdate) -> ApiResult<Todo> {
    client
        .put::<TodoById>(&TodoId { id }, update, RequestOptions::default())
        .await
}

pub async fn update(client: &ApiClient, id: u64, update: &TodoUpdate) -> ApiResult<Todo> {
    client
        .patch::<TodoById>(&TodoId { id }, update, RequestOptions::default())
        .await
}

pub async fn delete(client: &ApiClient, id: u64) -> ApiResult<DeletedTodo> {
    client
        .delete::<TodoById>(&TodoId { id }, RequestOptions::default())
        .await
}
