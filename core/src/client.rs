//! Blocking OCS provisioning client.
//!
//! # Design
//! `OcsClient` holds an immutable [`ClientConfig`] and a [`Transport`]. Each
//! public method marshals its parameters into a route and an optional form
//! body, then goes through [`OcsClient::call`], which attaches the OCS
//! headers, executes the request, and decodes the `<ocs>` envelope.
//!
//! Only local failures are errors. The remote's verdict lives in
//! `Ocs::meta` and is the caller's to interpret.

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::{self, Ocs};
use crate::error::{OcsError, OcsResult};
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, UreqTransport};
use crate::types::{NewUser, Operation};
use crate::validation;

/// Path prefix of the OCS v1 API on the server.
pub const API_ROOT: &str = "/ocs/v1.php";

/// Route of the user collection, relative to [`API_ROOT`].
pub const USERS_ROUTE: &str = "/cloud/users";

/// Route of the group collection, relative to [`API_ROOT`].
pub const GROUPS_ROUTE: &str = "/cloud/groups";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for the user/group provisioning endpoints.
#[derive(Debug, Clone)]
pub struct OcsClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl OcsClient<UreqTransport> {
    /// Client with the default 10 second blocking transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> OcsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `path` (relative to [`API_ROOT`]) with the
    /// `OCS-APIRequest` marker, form content type, and basic credentials.
    pub fn build_request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{API_ROOT}{path}", self.config.base_url()),
            headers: vec![
                ("OCS-APIRequest".to_string(), "true".to_string()),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
                ("Authorization".to_string(), self.config.basic_auth()),
            ],
            body,
        }
    }

    /// Send one request and decode the envelope.
    ///
    /// The HTTP status and `meta.statuscode` are not inspected.
    pub fn call(
        &self,
        operation: Operation,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> OcsResult<Ocs> {
        let request = self.build_request(method, path, body);
        debug!(%operation, %method, url = %request.url, "sending OCS request");

        let response = self.transport.execute(request).map_err(|source| {
            warn!(%operation, error = %source, "OCS request failed");
            OcsError::Transport { operation, source }
        })?;

        let ocs = envelope::decode(&response.body).map_err(|source| {
            warn!(%operation, status = response.status, error = %source, "malformed OCS response");
            OcsError::Decode { operation, source }
        })?;

        debug!(
            %operation,
            status = response.status,
            statuscode = ocs.meta.statuscode,
            "OCS response decoded"
        );
        Ok(ocs)
    }

    /// List user ids, optionally filtered by `search`. Result in `data.users`.
    pub fn list_users(&self, search: Option<&str>) -> OcsResult<Ocs> {
        let operation = Operation::ListUsers;
        let path = with_search(operation, USERS_ROUTE, search)?;
        self.call(operation, HttpMethod::Get, &path, None)
    }

    /// Fetch one user's profile into the profile fields of `data`.
    pub fn get_user(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::GetUser;
        let path = user_path(operation, userid, "")?;
        self.call(operation, HttpMethod::Get, &path, None)
    }

    /// Create a user from a full record.
    pub fn add_user(&self, user: &NewUser) -> OcsResult<Ocs> {
        self.add_user_as(Operation::AddUser, user)
    }

    /// Create a user from an email address alone. The user id is the part
    /// before `@`. Malformed addresses are rejected without a request.
    pub fn add_user_simple(&self, email: &str) -> OcsResult<Ocs> {
        let operation = Operation::AddUserSimple;
        let userid = validation::email_local_part(email).ok_or_else(|| {
            OcsError::validation(operation, format!("email '{email}' is not valid"))
        })?;

        let user = NewUser {
            userid: userid.to_string(),
            email: email.to_string(),
            ..NewUser::default()
        };
        self.add_user_as(operation, &user)
    }

    pub fn delete_user(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::DeleteUser;
        let path = user_path(operation, userid, "")?;
        self.call(operation, HttpMethod::Delete, &path, None)
    }

    /// Groups the user belongs to, in `data.groups`.
    pub fn list_user_groups(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::ListUserGroups;
        let path = user_path(operation, userid, "/groups")?;
        self.call(operation, HttpMethod::Get, &path, None)
    }

    pub fn add_user_to_group(&self, userid: &str, groupid: &str) -> OcsResult<Ocs> {
        self.membership(Operation::AddUserToGroup, HttpMethod::Post, userid, groupid)
    }

    pub fn remove_user_from_group(&self, userid: &str, groupid: &str) -> OcsResult<Ocs> {
        self.membership(Operation::RemoveUserFromGroup, HttpMethod::Delete, userid, groupid)
    }

    /// Ask the server to resend the welcome (password setup) email.
    pub fn resend_welcome_email(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::ResendWelcomeEmail;
        let path = user_path(operation, userid, "/welcome")?;
        self.call(operation, HttpMethod::Post, &path, None)
    }

    pub fn disable_user(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::DisableUser;
        let path = user_path(operation, userid, "/disable")?;
        self.call(operation, HttpMethod::Put, &path, None)
    }

    pub fn enable_user(&self, userid: &str) -> OcsResult<Ocs> {
        let operation = Operation::EnableUser;
        let path = user_path(operation, userid, "/enable")?;
        self.call(operation, HttpMethod::Put, &path, None)
    }

    /// List group ids, optionally filtered by `search`. Result in `data.groups`.
    pub fn list_groups(&self, search: Option<&str>) -> OcsResult<Ocs> {
        let operation = Operation::ListGroups;
        let path = with_search(operation, GROUPS_ROUTE, search)?;
        self.call(operation, HttpMethod::Get, &path, None)
    }

    fn add_user_as(&self, operation: Operation, user: &NewUser) -> OcsResult<Ocs> {
        if user.userid.is_empty() {
            return Err(OcsError::validation(operation, "user id must not be empty"));
        }
        let body = encode_form(operation, &user.form_fields())?;
        self.call(operation, HttpMethod::Post, USERS_ROUTE, Some(body))
    }

    fn membership(
        &self,
        operation: Operation,
        method: HttpMethod,
        userid: &str,
        groupid: &str,
    ) -> OcsResult<Ocs> {
        if groupid.is_empty() {
            return Err(OcsError::validation(operation, "group id must not be empty"));
        }
        let path = user_path(operation, userid, "/groups")?;
        let body = encode_form(operation, &[("groupid", groupid)])?;
        self.call(operation, method, &path, Some(body))
    }
}

/// `/cloud/users/{userid}{suffix}` with the id percent-encoded.
fn user_path(operation: Operation, userid: &str, suffix: &str) -> OcsResult<String> {
    if userid.is_empty() {
        return Err(OcsError::validation(operation, "user id must not be empty"));
    }
    Ok(format!("{USERS_ROUTE}/{}{suffix}", urlencoding::encode(userid)))
}

fn with_search(operation: Operation, route: &str, search: Option<&str>) -> OcsResult<String> {
    match search {
        Some(term) => {
            let query = encode_form(operation, &[("search", term)])?;
            Ok(format!("{route}?{query}"))
        }
        None => Ok(route.to_string()),
    }
}

fn encode_form(operation: Operation, fields: &[(&str, &str)]) -> OcsResult<String> {
    serde_urlencoded::to_string(fields).map_err(|e| OcsError::Transport {
        operation,
        source: Box::new(e),
    })
}
