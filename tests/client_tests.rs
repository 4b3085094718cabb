use httpmock::prelude::*;
use kobo_export::{Client, Config, ExportParams, ExportType};
use serde_json::json;

type TestResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

// base64("alice:secret")
const BASIC_AUTH: &str = "Basic YWxpY2U6c2VjcmV0";

fn client_for(server: &MockServer) -> TestResult<Client> {
    let config = Config {
        user: "alice".to_string(),
        password: "secret".to_string(),
        asset_id: "aBcD123".to_string(),
        base_url: server.base_url(),
    };
    Ok(Client::new(config)?)
}

#[test]
fn create_export_posts_form_with_defaults() -> TestResult<()> {
    let server = MockServer::start();
    let source = format!("{}/assets/aBcD123/", server.base_url());

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/exports/")
            .header("authorization", BASIC_AUTH)
            .x_www_form_urlencoded_tuple("source", &source)
            .x_www_form_urlencoded_tuple("type", "csv")
            .x_www_form_urlencoded_tuple("lang", "xml")
            .x_www_form_urlencoded_tuple("fields_from_all_versions", "true")
            .x_www_form_urlencoded_tuple("hierarchy_in_labels", "false")
            .x_www_form_urlencoded_tuple("group_sep", "/");
        then.status(201)
            .body(r#"{"uid":"e1","status":"created"}"#);
    });

    let client = client_for(&server)?;
    let created = client.create_export(&ExportParams::default())?;

    assert_eq!(created.status, 201);
    assert_eq!(created.body, r#"{"uid":"e1","status":"created"}"#);
    create_mock.assert();
    Ok(())
}

#[test]
fn create_export_sends_overridden_values_verbatim() -> TestResult<()> {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/exports/")
            .x_www_form_urlencoded_tuple("type", "xls")
            .x_www_form_urlencoded_tuple("lang", "English (en)")
            .x_www_form_urlencoded_tuple("fields_from_all_versions", "false")
            .x_www_form_urlencoded_tuple("hierarchy_in_labels", "true")
            .x_www_form_urlencoded_tuple("group_sep", ".");
        then.status(201).body("{}");
    });

    let params = ExportParams {
        export_type: ExportType::Xls,
        lang: "English (en)".to_string(),
        fields_from_all_versions: "false".to_string(),
        hierarchy_in_labels: "true".to_string(),
        group_sep: ".".to_string(),
    };
    client_for(&server)?.create_export(&params)?;

    create_mock.assert();
    Ok(())
}

#[test]
fn create_export_fails_on_error_status() -> TestResult<()> {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/exports/");
        then.status(400)
            .json_body(json!({"source": ["Invalid hyperlink - Object does not exist."]}));
    });

    let err = client_for(&server)?
        .create_export(&ExportParams::default())
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 400"));
    assert!(msg.contains("Object does not exist"));

    // no retry
    create_mock.assert_hits(1);
    Ok(())
}

#[test]
fn list_exports_filters_by_source_and_returns_body() -> TestResult<()> {
    let server = MockServer::start();
    let body = json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [{"uid": "e1", "result": "urlA"}, {"uid": "e2", "result": "urlB"}]
    });

    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/exports/")
            .query_param("q", "source:aBcD123")
            .header("authorization", BASIC_AUTH);
        then.status(200).json_body(body.clone());
    });

    let listing = client_for(&server)?.list_exports()?;
    assert_eq!(listing, body);
    list_mock.assert();
    Ok(())
}

#[test]
fn list_exports_fails_on_unauthorized() -> TestResult<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exports/");
        then.status(401)
            .json_body(json!({"detail": "Invalid username/password."}));
    });

    let err = client_for(&server)?.list_exports().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 401"));
    assert!(msg.contains("Invalid username/password."));
    Ok(())
}

#[test]
fn latest_export_url_takes_last_result() -> TestResult<()> {
    let server = MockServer::start();
    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/exports/")
            .query_param("q", "source:aBcD123");
        then.status(200)
            .json_body(json!({"results": [{"result": "urlA"}, {"result": "urlB"}]}));
    });

    let url = client_for(&server)?.latest_export_url()?;
    assert_eq!(url, "urlB");
    list_mock.assert();
    Ok(())
}

#[test]
fn latest_export_url_fails_on_empty_results() -> TestResult<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exports/");
        then.status(200).json_body(json!({"count": 0, "results": []}));
    });

    let err = client_for(&server)?.latest_export_url().unwrap_err();
    assert!(err.to_string().contains("no exports found for asset aBcD123"));
    Ok(())
}

#[test]
fn latest_export_url_fails_on_server_error() -> TestResult<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exports/");
        then.status(500).body("Internal Server Error");
    });

    let err = client_for(&server)?.latest_export_url().unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
    Ok(())
}

#[test]
fn latest_export_url_rejects_non_json() -> TestResult<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exports/");
        then.status(200).body("<html>login</html>");
    });

    let err = client_for(&server)?.latest_export_url().unwrap_err();
    assert!(err.to_string().contains("failed to parse API JSON"));
    Ok(())
}
