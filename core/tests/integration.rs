//! Provisioning lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through `UreqTransport`. Validates headers,
//! credentials, form encoding and XML decoding end-to-end.

use std::time::{Duration, Instant};

use ocs_client::{ClientConfig, NewUser, OcsClient, OcsError, Operation, UreqTransport};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

fn admin_client(base_url: &str) -> OcsClient {
    OcsClient::new(ClientConfig::new(
        mock_server::ADMIN_USER,
        mock_server::ADMIN_PASSWORD,
        base_url,
    ))
}

#[test]
fn provisioning_lifecycle() {
    let base_url = start_server();
    let client = admin_client(&base_url);

    // Step 1: only the seeded admin exists.
    let ocs = client.list_users(None).unwrap();
    assert!(ocs.meta.is_ok());
    assert_eq!(ocs.data.users, vec!["admin"]);

    // Step 2: create a full user with two groups.
    let user = NewUser {
        userid: "jane".to_string(),
        password: "correct horse".to_string(),
        display_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        quota: "5 GB".to_string(),
        language: "en".to_string(),
        groups: vec!["g1".to_string(), "g2".to_string()],
        subadmin: vec!["g2".to_string()],
    };
    let ocs = client.add_user(&user).unwrap();
    assert_eq!(ocs.meta.statuscode, 100);
    assert_eq!(ocs.data.id, "jane");

    // Step 3: creating it again is a remote failure, not an error.
    let ocs = client.add_user(&user).unwrap();
    assert_eq!(ocs.meta.status, "failure");
    assert_eq!(ocs.meta.statuscode, 102);

    // Step 4: simplified creation derives the id from the email.
    let ocs = client.add_user_simple("bob@example.org").unwrap();
    assert_eq!(ocs.data.id, "bob");

    // Step 5: profile and group lookups.
    let ocs = client.get_user("jane").unwrap();
    assert_eq!(ocs.data.displayname, "Jane Doe");
    assert_eq!(ocs.data.email, "jane@example.com");
    assert!(ocs.data.enabled);
    assert_eq!(ocs.data.groups, vec!["g1", "g2"]);

    let ocs = client.list_users(Some("o")).unwrap();
    assert_eq!(ocs.data.users, vec!["bob"]);

    let ocs = client.list_groups(None).unwrap();
    assert_eq!(ocs.data.groups, vec!["admin", "g1", "g2"]);

    // Step 6: membership changes, including a DELETE carrying a body.
    client.add_user_to_group("jane", "staff").unwrap();
    client.remove_user_from_group("jane", "g1").unwrap();
    let ocs = client.list_user_groups("jane").unwrap();
    assert_eq!(ocs.data.groups, vec!["g2", "staff"]);

    // Step 7: disable, check, enable.
    client.disable_user("jane").unwrap();
    assert!(!client.get_user("jane").unwrap().data.enabled);
    client.enable_user("jane").unwrap();
    assert!(client.get_user("jane").unwrap().data.enabled);

    // Step 8: welcome email.
    let ocs = client.resend_welcome_email("jane").unwrap();
    assert!(ocs.meta.is_ok());

    // Step 9: delete, then the user is gone.
    client.delete_user("jane").unwrap();
    let ocs = client.get_user("jane").unwrap();
    assert_eq!(ocs.meta.statuscode, 998);

    let ocs = client.list_users(None).unwrap();
    assert_eq!(ocs.data.users, vec!["admin", "bob"]);
}

#[test]
fn wrong_credentials_come_back_as_failure_envelope() {
    let base_url = start_server();
    let client = OcsClient::new(ClientConfig::new("admin", "wrong", base_url));

    let ocs = client.list_users(None).unwrap();
    assert_eq!(ocs.meta.statuscode, 997);
    assert!(ocs.data.users.is_empty());
}

#[test]
fn refused_connection_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = admin_client(&format!("http://{addr}"));
    let err = client.delete_user("jane").unwrap_err();
    assert!(matches!(
        err,
        OcsError::Transport {
            operation: Operation::DeleteUser,
            ..
        }
    ));
}

#[test]
fn invalid_email_never_reaches_the_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    // Nothing listens here; a request would surface as a transport error.
    let client = admin_client(&format!("http://{addr}"));
    let err = client.add_user_simple("not-an-email").unwrap_err();
    assert!(matches!(err, OcsError::Validation { .. }));
}

#[test]
fn stalled_server_is_a_transport_error() {
    // Accepts the connection but never writes a response.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((_stream, _)) = listener.accept() {
            std::thread::sleep(Duration::from_secs(5));
        }
    });

    let client = OcsClient::with_transport(
        ClientConfig::new(mock_server::ADMIN_USER, mock_server::ADMIN_PASSWORD, format!("http://{addr}")),
        UreqTransport::with_timeout(Duration::from_millis(200)),
    );

    let started = Instant::now();
    let err = client.list_users(None).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    assert!(matches!(
        err,
        OcsError::Transport {
            operation: Operation::ListUsers,
            ..
        }
    ));
}
