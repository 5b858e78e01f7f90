//! Full paste lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `UreqTransport` and `dispatch`. Validates
//! that request building, transport error mapping and response normalization
//! work end-to-end with the actual server.

use std::net::SocketAddr;
use std::time::Duration;

use paste_core::{
    dispatch, ApiError, ClientConfig, CreatePaste, EditPaste, ErrorKind, HttpMethod, HttpRequest,
    ListOptions, PasteClient, UreqTransport, Visibility,
};

fn start_server() -> SocketAddr {
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

    addr
}

#[test]
fn paste_lifecycle() {
    let addr = start_server();
    let base = format!("http://{addr}");
    let transport = UreqTransport::new();
    let anonymous = PasteClient::new(&base).unwrap();
    let alice =
        PasteClient::with_config(ClientConfig::new(&base).with_token(mock_server::ALICE_TOKEN))
            .unwrap();

    // Step 1: verify the token.
    let req = alice.build_verify_token().unwrap();
    let me = alice.parse_verify_token(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(me.username, "alice");
    assert_eq!(me.paste_count, 0);

    // Step 2: create a paste.
    let mut input = CreatePaste::new("Integration test", "hello world");
    input.language = Some("text".to_string());
    input.visibility = Visibility::Unlisted;
    let req = alice.build_create_paste(&input).unwrap();
    let created = alice.parse_create_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.author.as_deref(), Some("alice"));
    assert!(!created.encrypted);
    let id = created.id.clone();

    // Step 3: fetch it through a share URL.
    let share_url = format!("{base}/{id}/");
    let req = anonymous.build_get_paste(share_url.as_str(), None).unwrap();
    let fetched = anonymous.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(fetched.content, "hello world");
    assert_eq!(fetched.visibility, Visibility::Unlisted);

    // Step 4: edit the content.
    let edit = EditPaste {
        content: Some("goodbye".to_string()),
        ..Default::default()
    };
    let req = alice.build_edit_paste(id.as_str(), &edit).unwrap();
    let edited = alice.parse_edit_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(edited.content, "goodbye");
    assert_eq!(edited.title, "Integration test");

    // Step 5: list shows one paste.
    let req = alice.build_list_pastes(ListOptions::default()).unwrap();
    let page = alice.parse_list_pastes(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.pastes[0].id, id);

    // Step 6: user lookup counts it.
    let req = anonymous.build_get_user("alice").unwrap();
    let user = anonymous.parse_get_user(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(user.paste_count, 1);

    // Step 7: delete.
    let req = alice.build_delete_paste(id.as_str()).unwrap();
    alice.parse_delete_paste(dispatch(&transport, req).unwrap()).unwrap();

    // Step 8: get after delete is NotFound with the request path attached.
    let req = anonymous.build_get_paste(id.as_str(), None).unwrap();
    let err = anonymous.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { status: Some(404), .. }));
    assert_eq!(err.path(), Some(format!("/api/pastes/{id}").as_str()));

    // Step 9: delete again is NotFound too.
    let req = alice.build_delete_paste(id.as_str()).unwrap();
    let err = alice.parse_delete_paste(dispatch(&transport, req).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn encrypted_paste_round_trip() {
    let addr = start_server();
    let base = format!("http://{addr}");
    let transport = UreqTransport::new();
    let client = PasteClient::new(&base).unwrap();

    let mut input = CreatePaste::new("secret", "shh");
    input.password = Some("pw 1".to_string());
    let req = client.build_create_paste(&input).unwrap();
    let created = client.parse_create_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert!(created.encrypted);

    // No password: the legacy wording is surfaced as the stable message.
    let req = client.build_get_paste(created.id.as_str(), None).unwrap();
    let err = client.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteError);
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.message(), paste_core::normalize::ENCRYPTED_MESSAGE);

    // Wrong password embedded in the share URL, right one passed explicitly.
    let share_url = format!("{base}/{}?password=wrong", created.id);
    let req = client.build_get_paste(share_url.as_str(), None).unwrap();
    let err = client.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap_err();
    assert_eq!(err.message(), "incorrect password");

    let req = client.build_get_paste(share_url.as_str(), Some("pw 1")).unwrap();
    let paste = client.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(paste.content, "shh");
}

#[test]
fn bad_token_is_not_authorized() {
    let addr = start_server();
    let client =
        PasteClient::with_config(ClientConfig::new(&format!("http://{addr}")).with_token("bogus"))
            .unwrap();

    let req = client.build_verify_token().unwrap();
    let err = client
        .parse_verify_token(dispatch(&UreqTransport::new(), req).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    assert_eq!(err.message(), "Not authorized");
}

#[test]
fn legacy_shape_is_normalized() {
    let addr = start_server();
    let base = format!("http://{addr}");
    let transport = UreqTransport::new();
    let client = PasteClient::new(&base).unwrap();

    let req = client
        .build_create_paste(&CreatePaste::new("legacy", "old api"))
        .unwrap();
    let created = client.parse_create_paste(dispatch(&transport, req).unwrap()).unwrap();

    let req = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{base}/api/v1/pastes/{}", created.id),
        headers: Vec::new(),
        body: None,
        timeout: None,
    };
    let paste = client.parse_get_paste(dispatch(&transport, req).unwrap()).unwrap();
    assert_eq!(paste.content, "old api");
}

#[test]
fn timeout_surfaces_as_aborted() {
    let addr = start_server();
    let req = HttpRequest {
        method: HttpMethod::Get,
        url: format!("http://{addr}/api/slow"),
        headers: Vec::new(),
        body: None,
        timeout: Some(Duration::from_millis(200)),
    };
    let err = dispatch(&UreqTransport::new(), req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
    assert_eq!(err.path(), Some("/api/slow"));
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = PasteClient::new(&format!("http://{addr}")).unwrap();
    let req = client.build_get_user("alice").unwrap();
    let err = dispatch(&UreqTransport::new(), req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}
