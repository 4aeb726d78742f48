//! End-to-end workflow tests against a mock generation service and image host

use std::io::Read;
use std::path::Path;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use picture_prompt::{
    ArtifactKind, Config, DownloadOutcome, GenerateOutcome, GenerationStatus, ToggleOutcome,
    Workbench, WorkflowError,
};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn workbench(server: &MockServer, dir: &Path) -> Workbench {
    let config = Config::defaults()
        .api_base(server.base_url())
        .output_dir(dir);
    Workbench::from_config(&config).expect("workbench")
}

/// Serve `/img/<name>` with `body` and return the mock
async fn serve_image<'a>(server: &'a MockServer, name: &str, body: &[u8]) -> httpmock::Mock<'a> {
    let path = format!("/img/{}", name);
    let body = body.to_vec();
    server
        .mock_async(move |when, then| {
            when.method(GET).path(path);
            then.status(200).header("content-type", "image/png").body(body);
        })
        .await
}

async fn serve_generation<'a>(
    server: &'a MockServer,
    prompt: &str,
    images: serde_json::Value,
) -> httpmock::Mock<'a> {
    let prompt = prompt.to_string();
    server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/generate")
                .json_body(json!({ "prompt": prompt }));
            then.status(200).json_body(json!({
                "images": images,
                "keywords": "fur, whiskers, feathers"
            }));
        })
        .await
}

fn animal_images(server: &MockServer) -> serde_json::Value {
    json!([
        { "url": server.url("/img/cat"), "description": "cat" },
        { "url": server.url("/img/dog"), "description": "dog" },
        { "url": server.url("/img/bird"), "description": "bird" }
    ])
}

fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("read archive");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            (entry.name().to_string(), body)
        })
        .collect()
}

fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_generate_publishes_results() {
    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200).json_body(json!({
                "images": [
                    { "url": "https://images.example/1", "description": "snowy ridge" },
                    { "url": "https://images.example/2", "description": null }
                ],
                "keywords": "snow, ridge, dawn"
            }));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("mountains");
    let outcome = wb.generate().await;

    generate.assert_async().await;
    assert!(matches!(outcome, GenerateOutcome::Published { count: 2 }));
    assert_eq!(wb.status(), GenerationStatus::Succeeded);
    assert_eq!(wb.results().prompt, "mountains");
    assert_eq!(wb.results().get(1).unwrap().description, "No description available");
    assert_eq!(wb.snapshot().keywords, vec!["snow", "ridge", "dawn"]);
}

#[tokio::test]
async fn test_blank_prompt_sends_nothing() {
    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200).json_body(json!({ "images": [] }));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    for blank in ["", "   "] {
        wb.set_prompt(blank);
        assert!(!wb.can_generate());
        assert!(matches!(wb.generate().await, GenerateOutcome::Ignored));
    }
    assert_eq!(wb.status(), GenerationStatus::Idle);
    assert!(wb.results().is_empty());
    assert_eq!(generate.hits_async().await, 0);
}

#[tokio::test]
async fn test_server_error_keeps_previous_results() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "cats", animal_images(&server)).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate")
                .json_body(json!({ "prompt": "dogs" }));
            then.status(500).json_body(json!({ "error": "quota exceeded" }));
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("cats");
    wb.generate().await;
    wb.toggle_selection_mode();
    wb.toggle_item(0);

    wb.set_prompt("dogs");
    match wb.generate().await {
        GenerateOutcome::Failed(WorkflowError::HttpStatus { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("quota exceeded"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(wb.status(), GenerationStatus::Failed);
    assert_eq!(wb.results().prompt, "cats");
    assert_eq!(wb.results().len(), 3);
    assert_eq!(wb.selection().order(), &[0]);
}

#[tokio::test]
async fn test_unparseable_body_is_parse_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("anything");
    let outcome = wb.generate().await;
    assert!(matches!(outcome, GenerateOutcome::Failed(WorkflowError::ResponseParse(_))));
    assert_eq!(wb.status(), GenerationStatus::Failed);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::defaults()
        .api_base("http://127.0.0.1:1")
        .output_dir(dir.path());
    let mut wb = Workbench::from_config(&config).unwrap();

    wb.set_prompt("anything");
    let outcome = wb.generate().await;
    assert!(matches!(outcome, GenerateOutcome::Failed(WorkflowError::Transport(_))));
    assert!(wb.last_failure().is_some());
}

#[tokio::test]
async fn test_archive_follows_selection_order() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "animals", animal_images(&server)).await;
    serve_image(&server, "cat", b"cat-bytes").await;
    serve_image(&server, "dog", b"dog-bytes").await;
    serve_image(&server, "bird", b"bird-bytes").await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("animals");
    wb.generate().await;
    wb.toggle_selection_mode();
    assert_eq!(wb.toggle_item(1), ToggleOutcome::Added);
    assert_eq!(wb.toggle_item(2), ToggleOutcome::Added);

    let artifact = match wb.download_selected().await {
        DownloadOutcome::Saved(artifact) => artifact,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(artifact.kind, ArtifactKind::Archive);
    assert_eq!(artifact.path, dir.path().join("images.zip"));
    assert_eq!(
        archive_entries(&artifact.path),
        vec![
            ("image1.png".to_string(), b"dog-bytes".to_vec()),
            ("image2.png".to_string(), b"bird-bytes".to_vec()),
        ]
    );
}

#[tokio::test]
async fn test_click_order_beats_position_order() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "animals", animal_images(&server)).await;
    serve_image(&server, "cat", b"cat-bytes").await;
    serve_image(&server, "bird", b"bird-bytes").await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("animals");
    wb.generate().await;
    wb.toggle_selection_mode();
    wb.toggle_item(2);
    wb.toggle_item(0);

    let DownloadOutcome::Saved(artifact) = wb.download_selected().await else {
        panic!("download failed");
    };
    let entries = archive_entries(&artifact.path);
    assert_eq!(entries[0], ("image1.png".to_string(), b"bird-bytes".to_vec()));
    assert_eq!(entries[1], ("image2.png".to_string(), b"cat-bytes".to_vec()));
}

#[tokio::test]
async fn test_failed_member_leaves_no_files() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "animals", animal_images(&server)).await;
    let cat = serve_image(&server, "cat", b"cat-bytes").await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/img/dog");
            then.status(404);
        })
        .await;
    let bird = serve_image(&server, "bird", b"bird-bytes").await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("animals");
    wb.generate().await;
    wb.toggle_selection_mode();
    wb.toggle_item(0);
    wb.toggle_item(1);
    wb.toggle_item(2);

    match wb.download_selected().await {
        DownloadOutcome::Failed(WorkflowError::AssetRetrieval { index, reason, .. }) => {
            assert_eq!(index, Some(1));
            assert!(reason.contains("404"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(cat.hits_async().await, 1);
    assert_eq!(bird.hits_async().await, 0);
    assert!(dir_listing(dir.path()).is_empty());
    // The selection survives so the user can retry
    assert_eq!(wb.selection().order(), &[0, 1, 2]);
}

#[tokio::test]
async fn test_single_selection_matches_download_first() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "animals", animal_images(&server)).await;
    let mut png = PNG_HEADER.to_vec();
    png.extend_from_slice(b"cat");
    serve_image(&server, "cat", &png).await;

    let first_dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, first_dir.path());
    wb.set_prompt("animals");
    wb.generate().await;
    let DownloadOutcome::Saved(direct) = wb.download_first().await else {
        panic!("download_first failed");
    };

    let selected_dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, selected_dir.path());
    wb.set_prompt("animals");
    wb.generate().await;
    wb.toggle_selection_mode();
    wb.toggle_item(0);
    let DownloadOutcome::Saved(selected) = wb.download_selected().await else {
        panic!("download_selected failed");
    };

    assert_eq!(direct.kind, ArtifactKind::Single);
    assert_eq!(selected.kind, ArtifactKind::Single);
    assert_eq!(dir_listing(first_dir.path()), vec!["image.png"]);
    assert_eq!(dir_listing(selected_dir.path()), vec!["image.png"]);
    assert_eq!(
        std::fs::read(&direct.path).unwrap(),
        std::fs::read(&selected.path).unwrap()
    );
}

#[tokio::test]
async fn test_relative_urls_resolve_against_api_base() {
    let server = MockServer::start_async().await;
    serve_generation(
        &server,
        "placeholder",
        json!([{ "url": "/api/placeholder/300/300", "description": "placeholder" }]),
    )
    .await;
    let placeholder = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/placeholder/300/300");
            then.status(200).body("placeholder-bytes");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("placeholder");
    wb.generate().await;
    let DownloadOutcome::Saved(artifact) = wb.download_first().await else {
        panic!("download failed");
    };

    placeholder.assert_async().await;
    assert_eq!(std::fs::read(&artifact.path).unwrap(), b"placeholder-bytes");
}

#[tokio::test]
async fn test_new_generation_clears_selection() {
    let server = MockServer::start_async().await;
    serve_generation(&server, "animals", animal_images(&server)).await;
    serve_generation(
        &server,
        "mountains",
        json!([{ "url": server.url("/img/peak"), "description": "peak" }]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut wb = workbench(&server, dir.path());

    wb.set_prompt("animals");
    wb.generate().await;
    wb.toggle_selection_mode();
    wb.toggle_item(2);
    wb.toggle_item(1);

    wb.set_prompt("mountains");
    assert!(wb.generate().await.is_published());
    assert!(wb.selection().is_empty());
    assert_eq!(wb.results().len(), 1);
    assert!(matches!(wb.download_selected().await, DownloadOutcome::Nothing));
}
