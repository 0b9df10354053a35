use crate::common::TestApp;

const LOGIN_FAILED: &str = "Login Unsuccessful. Please check username/email and password";

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_account_is_created_and_sent_to_login() {
        let app = TestApp::spawn().await;

        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let login = app.get("/login").await;
        assert!(login.text.contains("Your account has been created! You can now log in."));

        let account = app.find_account("alice").await.expect("account row");
        assert_eq!(account.full_name, "Alice Liddell");
        assert_eq!(account.email, "alice@example.com");
        assert!(account.password_hash.starts_with("$argon2"));
        assert!(!account.password_hash.contains("wonderland"));
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_username() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let res = app
            .other_browser()
            .post_form(
                "/signup",
                &[
                    ("full_name", "Another Alice"),
                    ("username", "alice"),
                    ("email", "other@example.com"),
                    ("password", "wonderland"),
                    ("confirm_password", "wonderland"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("That username is taken. Please choose a different one."));
        assert!(res.text.contains(r#"value="other@example.com""#));
        assert!(res.text.contains(r#"value="Another Alice""#));
        assert!(!res.text.contains("wonderland"));
        assert!(app.find_account("alice").await.is_some());
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_email() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let res = app
            .other_browser()
            .post_form(
                "/signup",
                &[
                    ("full_name", "Bob Builder"),
                    ("username", "bobby"),
                    ("email", "alice@example.com"),
                    ("password", "canwefixit"),
                    ("confirm_password", "canwefixit"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("That email is taken. Please choose a different one."));
        assert!(res.text.contains(r#"value="bobby""#));
        assert!(app.find_account("bobby").await.is_none());
    }

    #[tokio::test]
    async fn invalid_fields_rerender_the_form_with_input_retained() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                "/signup",
                &[
                    ("full_name", "B"),
                    ("username", "bob"),
                    ("email", "not-an-email"),
                    ("password", "12345"),
                    ("confirm_password", "54321"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("Field must be between 2 and 100 characters long."));
        assert!(res.text.contains("Field must be between 4 and 80 characters long."));
        assert!(res.text.contains("Invalid email address."));
        assert!(res.text.contains("Field must be at least 6 characters long."));
        assert!(res.text.contains("Field must be equal to password."));
        assert!(res.text.contains(r#"value="bob""#));
        assert!(res.text.contains(r#"value="not-an-email""#));
        assert!(app.find_account("bob").await.is_none());
    }

    #[tokio::test]
    async fn logged_in_visitor_is_sent_home() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        app.get("/signup").await.assert_redirect("/home");
        app.get("/login").await.assert_redirect("/home");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn username_and_password_start_a_session() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        app.login("alice", "wonderland").await.assert_redirect("/home");

        let home = app.get("/home").await;
        assert_eq!(home.status, 200);
        assert!(home.text.contains("Welcome back, Alice Liddell!"));
        assert!(home.text.contains("Welcome, Alice Liddell"));
    }

    #[tokio::test]
    async fn email_works_in_place_of_username() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        app.login("alice@example.com", "wonderland")
            .await
            .assert_redirect("/home");
        assert_eq!(app.get("/").await.status, 200);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_account_fail_identically() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let wrong_password = app.login("alice", "looking-glass").await;
        let unknown = app.login("nobody@example.com", "looking-glass").await;

        assert_eq!(wrong_password.status, 401);
        assert_eq!(unknown.status, 401);
        assert!(wrong_password.text.contains(LOGIN_FAILED));
        assert!(unknown.text.contains(LOGIN_FAILED));

        app.get("/home").await.assert_redirect("/login?next=%2Fhome");
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_lookup() {
        let app = TestApp::spawn().await;

        let res = app.login("", "").await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("This field is required."));
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        app.get("/logout").await.assert_redirect("/login");
        let login = app.get("/login").await;
        assert!(login.text.contains("You have been logged out."));

        app.get("/home").await.assert_redirect("/login?next=%2Fhome");
    }

    #[tokio::test]
    async fn forged_session_cookie_is_ignored() {
        let app = TestApp::spawn().await;

        let res = app.get_with_cookie("/home", "session=forged.token.value").await;

        res.assert_redirect("/login?next=%2Fhome");
    }
}

mod protected_pages {
    use super::*;

    #[tokio::test]
    async fn every_protected_page_redirects_to_login() {
        let app = TestApp::spawn().await;

        for (path, location) in [
            ("/", "/login?next=%2F"),
            ("/home", "/login?next=%2Fhome"),
            ("/logout", "/login?next=%2Flogout"),
            ("/upload_csv", "/login?next=%2Fupload_csv"),
            ("/preview_data", "/login?next=%2Fpreview_data"),
            ("/view_file/1", "/login?next=%2Fview_file%2F1"),
            ("/visuals_analysis", "/login?next=%2Fvisuals_analysis"),
        ] {
            app.get(path).await.assert_redirect(location);
        }
    }

    #[tokio::test]
    async fn login_page_explains_the_redirect_and_keeps_next() {
        let app = TestApp::spawn().await;

        app.get("/preview_data").await;
        let login = app.get("/login?next=%2Fpreview_data").await;

        assert!(login.text.contains("Please log in to access this page."));
        assert!(login.text.contains(r#"name="next" value="/preview_data""#));
    }

    #[tokio::test]
    async fn login_returns_to_the_requested_page() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let res = app
            .post_form(
                "/login",
                &[
                    ("username_or_email", "alice"),
                    ("password", "wonderland"),
                    ("next", "/preview_data"),
                ],
            )
            .await;

        res.assert_redirect("/preview_data");
    }

    #[tokio::test]
    async fn offsite_next_is_ignored() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        for next in ["https://evil.example/", "//evil.example/"] {
            let browser = app.other_browser();
            let res = browser
                .post_form(
                    "/login",
                    &[
                        ("username_or_email", "alice"),
                        ("password", "wonderland"),
                        ("next", next),
                    ],
                )
                .await;
            res.assert_redirect("/home");
        }
    }
}

mod forgery {
    use super::*;

    const ALICE: [(&str, &str); 2] = [("username_or_email", "alice"), ("password", "wonderland")];

    #[tokio::test]
    async fn forms_carry_the_browser_token() {
        let app = TestApp::spawn().await;
        let token = app.csrf_token().await;
        let hidden = format!(r#"name="csrf_token" value="{token}""#);

        assert!(app.get("/login").await.text.contains(&hidden));
        assert!(app.get("/signup").await.text.contains(&hidden));
    }

    #[tokio::test]
    async fn login_without_a_token_does_not_start_a_session() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;

        let res = app.post_form_raw("/login", &ALICE).await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("The CSRF token is missing."));
        assert!(res.text.contains(r#"value="alice""#));
        app.get("/home").await.assert_redirect("/login?next=%2Fhome");
    }

    #[tokio::test]
    async fn login_with_a_wrong_token_does_not_start_a_session() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;
        let token = app.csrf_token().await;
        let forged = token.chars().rev().collect::<String>();

        let mut fields = ALICE.to_vec();
        fields.push(("csrf_token", forged.as_str()));
        let res = app.post_form_raw("/login", &fields).await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("The CSRF tokens do not match."));
        app.get("/home").await.assert_redirect("/login?next=%2Fhome");
    }

    #[tokio::test]
    async fn token_from_another_browser_is_rejected() {
        let app = TestApp::spawn().await;
        app.signup("Alice Liddell", "alice", "alice@example.com", "wonderland")
            .await;
        let attacker_token = app.csrf_token().await;

        let victim = app.other_browser();
        let mut fields = ALICE.to_vec();
        fields.push(("csrf_token", attacker_token.as_str()));
        let res = victim.post_form_raw("/login", &fields).await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("The CSRF session token is missing."));
        victim.get("/home").await.assert_redirect("/login?next=%2Fhome");
    }

    #[tokio::test]
    async fn signup_without_a_token_creates_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form_raw(
                "/signup",
                &[
                    ("full_name", "Mallory Doe"),
                    ("username", "mallory"),
                    ("email", "mallory@example.com"),
                    ("password", "password123"),
                    ("confirm_password", "password123"),
                ],
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.text.contains("The CSRF token is missing."));
        assert!(res.text.contains(r#"value="mallory""#));
        assert!(app.find_account("mallory").await.is_none());
    }
}
