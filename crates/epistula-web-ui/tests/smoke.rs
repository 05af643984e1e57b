mod common;

use common::{
    PASSWORD, ROOT_EMAIL, STUDENT_EMAIL, TestServer, expired_token, location, select_attr,
    select_count, student_token,
};

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn anonymous_root_redirects_to_login() {
    let server = TestServer::start().await;
    let driver = server.driver();

    let resp = driver.get("/").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/login");

    server.shutdown().await;
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn protected_page_redirects_with_return_path() {
    let server = TestServer::start().await;
    let driver = server.driver();

    let resp = driver.get("/universities?page=2").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/login?redirect=%2Funiversities%3Fpage%3D2");
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn wrong_password_rerenders_login_form() {
    let server = TestServer::start().await;
    let driver = server.driver();

    let resp = driver.login(ROOT_EMAIL, "nope").await;
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert!(
        body.contains("Invalid email or password"),
        "Expected a credentials error, got: {body}"
    );
    assert_eq!(select_attr(&body, "input[name=email]", "value"), [ROOT_EMAIL]);

    // No session was stored
    assert_eq!(driver.get("/dashboard").await.status(), 303);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn login_then_dashboard_greets_root() {
    let server = TestServer::start().await;
    let driver = server.driver();

    driver.login_ok(ROOT_EMAIL).await;

    let resp = driver.get("/dashboard").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-cache",
        "HTML must not be cached"
    );

    let body = resp.text().await.unwrap();
    assert!(body.contains("Welcome, Root Admin"), "got: {body}");
    assert_eq!(select_count(&body, "[data-testid=root-badge]"), 1);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn greeting_falls_back_to_email() {
    let server = TestServer::start().await;
    let driver = server.driver();

    driver.login_ok(STUDENT_EMAIL).await;

    let body = driver.get("/dashboard").await.text().await.unwrap();
    assert!(body.contains(&format!("Welcome, {STUDENT_EMAIL}")), "got: {body}");
    assert_eq!(select_count(&body, "[data-testid=root-badge]"), 0);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn login_follows_local_redirect_only() {
    let server = TestServer::start().await;

    let driver = server.driver();
    let resp = driver
        .post_form(
            "/login",
            &[
                ("email", ROOT_EMAIL),
                ("password", PASSWORD),
                ("redirect", "/universities/1"),
            ],
        )
        .await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/universities/1");

    let driver = server.driver();
    let resp = driver
        .post_form(
            "/login",
            &[
                ("email", ROOT_EMAIL),
                ("password", PASSWORD),
                ("redirect", "//evil.example"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/dashboard");

    let driver = server.driver();
    let resp = driver
        .post_form(
            "/login",
            &[
                ("email", ROOT_EMAIL),
                ("password", PASSWORD),
                ("redirect", "/\\evil.example"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/dashboard");

    // Already logged in: the query string target is checked the same way
    let resp = driver.get("/login?redirect=%2F%5Cevil.example").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard");
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn universities_are_paginated_cards() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let body = driver.get("/universities").await.text().await.unwrap();
    assert_eq!(select_count(&body, "[data-testid=entity-card]"), 12);
    assert_eq!(select_count(&body, "button.m-pagination__prev[disabled]"), 1);
    assert_eq!(
        select_attr(&body, "a.m-pagination__next", "href"),
        ["/universities?page=2"]
    );
    assert_eq!(
        select_attr(&body, ".m-entityCard__logo img", "src"),
        [format!("{}/storage/logo2.png", server.backend_url())]
    );
    // Root sees the management controls
    assert_eq!(select_count(&body, "form[action='/universities']"), 1);
    assert_eq!(select_count(&body, "form.o-cardGrid__delete"), 12);

    let body = driver.get("/universities?page=2").await.text().await.unwrap();
    assert_eq!(select_count(&body, "[data-testid=entity-card]"), 3);
    assert_eq!(select_count(&body, "button.m-pagination__next[disabled]"), 1);
    assert!(body.contains("Page 2 of 2"));

    // Out of range pages are clamped
    let body = driver.get("/universities?page=99").await.text().await.unwrap();
    assert!(body.contains("Page 2 of 2"));
    let body = driver.get("/universities?page=abc").await.text().await.unwrap();
    assert!(body.contains("Page 1 of 2"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn university_detail_renders_sanitized_markdown() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let resp = driver.get("/universities/1").await;
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();

    assert_eq!(select_count(&body, ".m-entityHeader__description strong"), 1);
    assert_eq!(select_count(&body, ".m-entityHeader__description script"), 0);
    assert_eq!(select_count(&body, "[data-testid=entity-card]"), 2);
    assert_eq!(
        select_attr(&body, ".m-entityCard__title a", "href"),
        ["/universities/1/faculties/10", "/universities/1/faculties/11"]
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn faculty_page_lists_subjects() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let body = driver
        .get("/universities/1/faculties/10")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Faculty of Science"));
    assert!(body.contains("Algebra"));

    assert_eq!(driver.get("/universities/1/faculties/999").await.status(), 404);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn people_pages() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(STUDENT_EMAIL).await;

    let body = driver
        .get("/universities/1/professors")
        .await
        .text()
        .await
        .unwrap();
    assert_eq!(select_count(&body, "[data-testid=people-table] tbody tr"), 1);
    assert!(body.contains("Ada Lovelace"));

    let body = driver
        .get("/universities/1/students")
        .await
        .text()
        .await
        .unwrap();
    assert_eq!(select_count(&body, "[data-testid=empty-state]"), 1);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn missing_university_shows_backend_detail() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let resp = driver.get("/universities/404").await;
    assert_eq!(resp.status(), 404);
    assert!(resp.text().await.unwrap().contains("University not found"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn logout_clears_session() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;
    assert_eq!(driver.get("/dashboard").await.status(), 200);

    let resp = driver.post_form("/logout", &[]).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/login");

    assert_eq!(driver.get("/dashboard").await.status(), 303);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rejected_token_sends_to_login() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.set_token(&expired_token());

    // The token decodes fine, so the page is attempted
    let resp = driver.get("/universities").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/login?expired=true");

    // and the stale session is gone afterwards
    let resp = driver.get("/dashboard").await;
    assert_eq!(resp.status(), 303);
    assert!(location(&resp).starts_with("/login?redirect="));

    let body = driver.get("/login?expired=true").await.text().await.unwrap();
    assert_eq!(select_count(&body, "[data-testid=expired-notice]"), 1);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn non_root_cannot_manage_universities() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.set_token(&student_token());

    let body = driver.get("/universities").await.text().await.unwrap();
    assert_eq!(select_count(&body, "form[action='/universities']"), 0);
    assert_eq!(select_count(&body, "form.o-cardGrid__delete"), 0);

    let resp = driver
        .post_form("/universities", &[("name", "New"), ("code", "NEW")])
        .await;
    assert_eq!(resp.status(), 403);

    let resp = driver.post_form("/universities/1/delete", &[]).await;
    assert_eq!(resp.status(), 403);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn root_creates_university() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let resp = driver
        .post_form(
            "/universities",
            &[("name", " New University "), ("code", "NU"), ("description", "")],
        )
        .await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/universities");

    let resp = driver
        .post_form("/universities", &[("name", "  "), ("code", "NU")])
        .await;
    assert_eq!(resp.status(), 400);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn root_deletes_faculty() {
    let server = TestServer::start().await;
    let driver = server.driver();
    driver.login_ok(ROOT_EMAIL).await;

    let body = driver.get("/universities/1").await.text().await.unwrap();
    assert_eq!(
        select_attr(&body, "form.o-cardGrid__delete", "action"),
        [
            "/universities/1/faculties/10/delete",
            "/universities/1/faculties/11/delete"
        ]
    );

    let resp = driver
        .post_form("/universities/1/faculties/10/delete", &[])
        .await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/universities/1");

    let student = server.driver();
    student.set_token(&student_token());
    let body = student.get("/universities/1").await.text().await.unwrap();
    assert_eq!(select_count(&body, "form.o-cardGrid__delete"), 0);
    let resp = student
        .post_form("/universities/1/faculties/10/delete", &[])
        .await;
    assert_eq!(resp.status(), 403);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn static_files_and_service_worker() {
    let server = TestServer::start().await;
    let driver = server.driver();

    let resp = driver.get("/sw.js").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
    let sw = resp.text().await.unwrap();
    assert!(sw.contains("/api/"));
    // Navigations are never cached, so there is nothing to fall back to
    assert!(sw.contains("if (request.mode === 'navigate') return;"));
    assert!(!sw.contains("catch(() => caches.match(request))"));

    let resp = driver.get("/assets/style.css").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "public, max-age=600"
    );

    let resp = driver.get("/no/such/page").await;
    assert_eq!(resp.status(), 404);
}
