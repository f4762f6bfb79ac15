//! In-memory emulation of the OCS v1 user provisioning endpoints.
//!
//! Requests must carry `OCS-APIRequest: true` and basic credentials for
//! [`ADMIN_USER`] / [`ADMIN_PASSWORD`]. Answers are `<ocs>` XML documents;
//! logical failures use HTTP 200 with a failure `statuscode`, as OCS v1 does.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::escape::escape;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const ADMIN_GROUP: &str = "admin";

pub const STATUS_OK: u32 = 100;
pub const STATUS_INVALID_INPUT: u32 = 101;
pub const STATUS_ALREADY_EXISTS: u32 = 102;
pub const STATUS_UNAUTHORIZED: u32 = 997;
pub const STATUS_NOT_FOUND: u32 = 998;

#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub quota: String,
    pub language: String,
    pub enabled: bool,
    pub groups: Vec<String>,
    pub subadmin: Vec<String>,
    pub welcome_emails_sent: u32,
}

impl User {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            email: String::new(),
            quota: "none".to_string(),
            language: String::new(),
            enabled: true,
            groups: Vec::new(),
            subadmin: Vec::new(),
            welcome_emails_sent: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct Directory {
    pub users: BTreeMap<String, User>,
    pub groups: BTreeSet<String>,
}

impl Directory {
    /// A directory holding only the admin account.
    pub fn seeded() -> Self {
        let mut admin = User::new(ADMIN_USER);
        admin.groups.push(ADMIN_GROUP.to_string());
        let mut directory = Directory::default();
        directory.groups.insert(ADMIN_GROUP.to_string());
        directory.users.insert(ADMIN_USER.to_string(), admin);
        directory
    }
}

pub type Db = Arc<RwLock<Directory>>;

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Directory::seeded())))
}

/// Router over an existing directory, so tests can inspect state afterwards.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/ocs/v1.php/cloud/users", get(list_users).post(add_user))
        .route("/ocs/v1.php/cloud/users/{id}", get(get_user).delete(delete_user))
        .route(
            "/ocs/v1.php/cloud/users/{id}/groups",
            get(user_groups).post(add_to_group).delete(remove_from_group),
        )
        .route("/ocs/v1.php/cloud/users/{id}/welcome", post(resend_welcome))
        .route("/ocs/v1.php/cloud/users/{id}/enable", put(enable_user))
        .route("/ocs/v1.php/cloud/users/{id}/disable", put(disable_user))
        .route("/ocs/v1.php/cloud/groups", get(list_groups))
        .layer(middleware::from_fn(require_api_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Response rendering
// ---------------------------------------------------------------------------

fn ocs(http_status: StatusCode, statuscode: u32, message: &str, data: &str) -> Response {
    let status = if statuscode == STATUS_OK { "ok" } else { "failure" };
    let body = format!(
        "<?xml version=\"1.0\"?>\n<ocs>\n <meta>\n  <status>{status}</status>\n  \
         <statuscode>{statuscode}</statuscode>\n  <message>{}</message>\n  \
         <totalitems></totalitems>\n  <itemsperpage></itemsperpage>\n </meta>\n \
         <data>{data}</data>\n</ocs>\n",
        escape(message)
    );
    (
        http_status,
        [(header::CONTENT_TYPE, "text/xml; charset=UTF-8")],
        body,
    )
        .into_response()
}

fn ok(data: &str) -> Response {
    ocs(StatusCode::OK, STATUS_OK, "OK", data)
}

fn failure(statuscode: u32, message: &str) -> Response {
    ocs(StatusCode::OK, statuscode, message, "")
}

fn user_not_found() -> Response {
    failure(STATUS_NOT_FOUND, "The requested user could not be found")
}

fn element_list(tag: &str, items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let elements: String = items
        .into_iter()
        .map(|item| format!("<element>{}</element>", escape(item.as_ref())))
        .collect();
    format!("<{tag}>{elements}</{tag}>")
}

fn user_profile(user: &User) -> String {
    // OCS v1 renders `false` as an empty element.
    let enabled = if user.enabled { "1" } else { "" };
    format!(
        "<enabled>{enabled}</enabled><id>{}</id><backend>Database</backend>\
         <quota><quota>{}</quota><used>0</used></quota>\
         <email>{}</email><displayname>{}</displayname><language>{}</language>{}",
        escape(&user.id),
        escape(&user.quota),
        escape(&user.email),
        escape(&user.display_name),
        escape(&user.language),
        element_list("groups", &user.groups),
    )
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn require_api_auth(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let api_request = headers
        .get("OCS-APIRequest")
        .and_then(|value| value.to_str().ok())
        == Some("true");
    if !api_request {
        debug!(uri = %request.uri(), "missing OCS-APIRequest header");
        return ocs(StatusCode::UNAUTHORIZED, STATUS_UNAUTHORIZED, "CSRF check failed", "");
    }
    if !has_admin_credentials(headers) {
        debug!(uri = %request.uri(), "rejected credentials");
        return ocs(StatusCode::UNAUTHORIZED, STATUS_UNAUTHORIZED, "Unauthorised", "");
    }
    next.run(request).await
}

fn has_admin_credentials(headers: &HeaderMap) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
    else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded) else {
        return false;
    };
    decoded == format!("{ADMIN_USER}:{ADMIN_PASSWORD}").as_bytes()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct Search {
    pub search: Option<String>,
}

fn matches_search(candidate: &str, search: &Option<String>) -> bool {
    search
        .as_deref()
        .map_or(true, |term| candidate.to_lowercase().contains(&term.to_lowercase()))
}

async fn list_users(State(db): State<Db>, Query(query): Query<Search>) -> Response {
    let directory = db.read().await;
    let ids = directory
        .users
        .keys()
        .filter(|id| matches_search(id, &query.search));
    ok(&element_list("users", ids))
}

async fn list_groups(State(db): State<Db>, Query(query): Query<Search>) -> Response {
    let directory = db.read().await;
    let groups = directory
        .groups
        .iter()
        .filter(|group| matches_search(group, &query.search));
    ok(&element_list("groups", groups))
}

async fn add_user(State(db): State<Db>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    let mut user = User::new("");
    for (name, value) in fields {
        match name.as_str() {
            "userid" => user.id = value,
            "displayName" => user.display_name = value,
            "email" => user.email = value,
            "quota" => user.quota = value,
            "language" => user.language = value,
            "groups[]" => user.groups.push(value),
            "subadmin[]" => user.subadmin.push(value),
            _ => {}
        }
    }
    if user.id.is_empty() {
        return failure(STATUS_INVALID_INPUT, "No user id given");
    }
    if user.display_name.is_empty() {
        user.display_name = user.id.clone();
    }

    let mut directory = db.write().await;
    if directory.users.contains_key(&user.id) {
        return failure(STATUS_ALREADY_EXISTS, "User already exists");
    }
    directory.groups.extend(user.groups.iter().cloned());
    directory.groups.extend(user.subadmin.iter().cloned());
    info!(userid = %user.id, "user created");
    let data = format!("<id>{}</id>", escape(&user.id));
    directory.users.insert(user.id.clone(), user);
    ok(&data)
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let directory = db.read().await;
    match directory.users.get(&id) {
        Some(user) => ok(&user_profile(user)),
        None => user_not_found(),
    }
}

async fn delete_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut directory = db.write().await;
    match directory.users.remove(&id) {
        Some(_) => {
            info!(userid = %id, "user deleted");
            ok("")
        }
        None => user_not_found(),
    }
}

async fn user_groups(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let directory = db.read().await;
    match directory.users.get(&id) {
        Some(user) => ok(&element_list("groups", &user.groups)),
        None => user_not_found(),
    }
}

#[derive(Deserialize)]
pub struct GroupForm {
    #[serde(default)]
    pub groupid: String,
}

async fn add_to_group(
    State(db): State<Db>,
    Path(id): Path<String>,
    Form(form): Form<GroupForm>,
) -> Response {
    if form.groupid.is_empty() {
        return failure(STATUS_INVALID_INPUT, "No group specified");
    }
    let mut directory = db.write().await;
    let Some(user) = directory.users.get_mut(&id) else {
        return user_not_found();
    };
    if !user.groups.contains(&form.groupid) {
        user.groups.push(form.groupid.clone());
    }
    directory.groups.insert(form.groupid);
    ok("")
}

async fn remove_from_group(
    State(db): State<Db>,
    Path(id): Path<String>,
    Form(form): Form<GroupForm>,
) -> Response {
    if form.groupid.is_empty() {
        return failure(STATUS_INVALID_INPUT, "No group specified");
    }
    let mut directory = db.write().await;
    let Some(user) = directory.users.get_mut(&id) else {
        return user_not_found();
    };
    user.groups.retain(|group| group != &form.groupid);
    ok("")
}

async fn resend_welcome(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut directory = db.write().await;
    let Some(user) = directory.users.get_mut(&id) else {
        return user_not_found();
    };
    if user.email.is_empty() {
        return failure(STATUS_INVALID_INPUT, "Email address not available");
    }
    user.welcome_emails_sent += 1;
    ok("")
}

async fn enable_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    set_enabled(db, id, true).await
}

async fn disable_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    set_enabled(db, id, false).await
}

async fn set_enabled(db: Db, id: String, enabled: bool) -> Response {
    let mut directory = db.write().await;
    let Some(user) = directory.users.get_mut(&id) else {
        return user_not_found();
    };
    user.enabled = enabled;
    ok("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_directory_contains_admin() {
        let directory = Directory::seeded();
        let admin = directory.users.get(ADMIN_USER).unwrap();
        assert_eq!(admin.groups, vec![ADMIN_GROUP]);
        assert!(directory.groups.contains(ADMIN_GROUP));
    }

    #[test]
    fn element_list_escapes_items() {
        assert_eq!(
            element_list("users", ["a&b", "c"]),
            "<users><element>a&amp;b</element><element>c</element></users>"
        );
    }

    #[test]
    fn disabled_user_renders_empty_enabled_element() {
        let mut user = User::new("jane");
        user.enabled = false;
        assert!(user_profile(&user).starts_with("<enabled></enabled>"));
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search("Alice", &Some("ali".to_string())));
        assert!(matches_search("bob", &None));
        assert!(!matches_search("bob", &Some("ali".to_string())));
    }
}
