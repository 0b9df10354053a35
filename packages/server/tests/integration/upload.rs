use crate::common::{MAX_UPLOAD_SIZE, PLACEMENT_CSV, TestApp};

mod accepted {
    use super::*;

    #[tokio::test]
    async fn upload_creates_one_row_and_a_readable_blob() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;
        let alice = app.find_account("alice").await.unwrap();

        app.upload("data.csv", PLACEMENT_CSV)
            .await
            .assert_redirect("/preview_data");

        let uploads = app.uploads().await;
        assert_eq!(uploads.len(), 1);
        let upload = &uploads[0];
        assert_eq!(upload.account_id, alice.id);
        assert_eq!(upload.filename, "data.csv");
        assert!(upload.storage_key.starts_with(&format!("{}_", alice.id)));
        assert!(upload.storage_key.ends_with("_data.csv"));

        let stored = std::fs::read(app.blob_path(&upload.storage_key)).unwrap();
        assert_eq!(stored, PLACEMENT_CSV.as_bytes());

        let list = app.get("/preview_data").await;
        assert!(list.text.contains("File successfully uploaded and saved!"));
    }

    #[tokio::test]
    async fn extension_check_ignores_case() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        app.upload("DATA.CSV", PLACEMENT_CSV)
            .await
            .assert_redirect("/preview_data");
        assert_eq!(app.uploads().await.len(), 1);
    }

    #[tokio::test]
    async fn repeated_uploads_accumulate_under_distinct_keys() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        app.upload("data.csv", PLACEMENT_CSV).await;
        app.upload("data.csv", PLACEMENT_CSV).await;

        let uploads = app.uploads().await;
        assert_eq!(uploads.len(), 2);
        assert_ne!(uploads[0].storage_key, uploads[1].storage_key);
        assert_eq!(app.stored_files().len(), 2);
    }

    #[tokio::test]
    async fn path_components_never_reach_the_upload_dir() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        app.upload("../../etc/evil.csv", PLACEMENT_CSV)
            .await
            .assert_redirect("/preview_data");

        let uploads = app.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert!(!uploads[0].filename.contains('/'));
        assert!(!uploads[0].storage_key.contains('/'));
        assert!(uploads[0].storage_key.ends_with("evil.csv"));
        assert_eq!(app.stored_files(), vec![uploads[0].storage_key.clone()]);
    }
}

mod rejected {
    use super::*;

    async fn assert_rejected(app: &TestApp, res: crate::common::TestResponse, message: &str) {
        assert_eq!(res.status, 400);
        assert!(res.text.contains(message), "missing {message:?} in {}", res.text);
        assert!(res.text.contains(r#"enctype="multipart/form-data""#));
        assert!(app.uploads().await.is_empty());
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn non_csv_extension_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let res = app.upload("notes.txt", "a,b\n1,2\n").await;
        assert_rejected(&app, res, "Allowed file types are CSV only!").await;

        let res = app.upload("no_extension", "a,b\n1,2\n").await;
        assert_rejected(&app, res, "Allowed file types are CSV only!").await;
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let res = app.upload("data.csv", "").await;
        assert_rejected(&app, res, "The selected file is empty").await;
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let res = app.upload("", PLACEMENT_CSV).await;
        assert_rejected(&app, res, "No selected file").await;
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let form = reqwest::multipart::Form::new().text("comment", "where is the file?");
        let res = app.post_multipart(form).await;
        assert_rejected(&app, res, "No file part").await;
    }

    #[tokio::test]
    async fn upload_without_a_token_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let part = reqwest::multipart::Part::bytes(PLACEMENT_CSV.as_bytes())
            .file_name("data.csv")
            .mime_str("text/csv")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("file", part);
        let res = app.post_multipart_raw(form).await;
        assert_rejected(&app, res, "The CSRF token is missing.").await;
    }

    #[tokio::test]
    async fn upload_with_a_wrong_token_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let part = reqwest::multipart::Part::bytes(PLACEMENT_CSV.as_bytes())
            .file_name("data.csv")
            .mime_str("text/csv")
            .unwrap();
        let form = reqwest::multipart::Form::new()
            .text("csrf_token", "not-the-token")
            .part("file", part);
        let res = app.post_multipart_raw(form).await;
        assert_rejected(&app, res, "The CSRF tokens do not match.").await;
    }

    #[tokio::test]
    async fn body_over_the_request_limit_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let body = vec![b'7'; (MAX_UPLOAD_SIZE + 64 * 1024 + 1024) as usize];
        let res = app.upload("huge.csv", body).await;
        assert_rejected(&app, res, "File exceeds the maximum upload size").await;
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        app.signed_in_as("alice").await;

        let mut body = String::from("value\n");
        while body.len() as u64 <= MAX_UPLOAD_SIZE {
            body.push_str("1234567\n");
        }
        let res = app.upload("big.csv", body).await;
        assert_rejected(&app, res, "File exceeds the maximum upload size").await;
    }
}

#[tokio::test]
async fn upload_form_requires_login() {
    let app = TestApp::spawn().await;

    app.get("/upload_csv")
        .await
        .assert_redirect("/login?next=%2Fupload_csv");

    let res = app.upload("data.csv", PLACEMENT_CSV).await;
    res.assert_redirect("/login?next=%2Fupload_csv");
    assert!(app.uploads().await.is_empty());
}

#[tokio::test]
async fn upload_form_renders_for_logged_in_account() {
    let app = TestApp::spawn().await;
    app.signed_in_as("alice").await;

    let res = app.get("/upload_csv").await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains(r#"accept=".csv""#));
}
