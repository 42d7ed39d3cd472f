use serde_json::Value;

#[test]
fn openapi_documents_admin_user_fields() -> anyhow::Result<()> {
    let doc = back_office::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let props = v
        .get("components")
        .and_then(Value::as_object)
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
        .and_then(|s| s.get("AdminUser"))
        .and_then(Value::as_object)
        .and_then(|t| t.get("properties"))
        .and_then(Value::as_object)
        .expect("components.schemas.AdminUser.properties must exist");

    let keys = ["id", "name", "email", "role", "status", "permissions", "created_at"];
    for k in &keys {
        assert!(props.contains_key(*k), "OpenAPI AdminUser schema missing '{}'", k);
    }

    Ok(())
}

#[test]
fn openapi_lists_permission_routes_and_bearer_scheme() -> anyhow::Result<()> {
    let doc = back_office::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let paths = v.get("paths").and_then(Value::as_object).expect("paths must exist");
    for path in [
        "/auth/login",
        "/auth/me/permissions",
        "/permissions/registry",
        "/admin-users",
        "/admin-users/{id}/permissions",
        "/admin-users/{id}/permissions/toggle",
    ] {
        assert!(paths.contains_key(path), "OpenAPI missing path '{}'", path);
    }

    let scheme = v
        .pointer("/components/securitySchemes/bearerAuth/scheme")
        .and_then(Value::as_str);
    assert_eq!(scheme, Some("bearer"));

    let server = v.pointer("/servers/0/url").and_then(Value::as_str).unwrap_or_default();
    assert!(server.ends_with("localhost:8000"), "unexpected server url: {}", server);

    Ok(())
}
