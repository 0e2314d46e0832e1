//! Acquisition against a local mock of the HuggingFace and GitHub hosts

use httpmock::prelude::*;
use modelpack_cli::acquire::{AcquisitionOutcome, AcquisitionPhase, Acquirer};
use modelpack_cli::core::ModelpackError;
use modelpack_cli::provider::{CancellationToken, DownloadProgress, ProviderEndpoints};
use modelpack_cli::test_utils::init_test_logging;
use serde_json::json;
use tempfile::TempDir;

const LARGE_BODY_LEN: usize = 4 * 1024 * 1024;

fn acquirer(server: &MockServer) -> Acquirer {
    init_test_logging(None);
    Acquirer::new(ProviderEndpoints::with_base_url(server.base_url()))
}

#[tokio::test]
async fn test_huggingface_folder_downloads_direct_children() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/models/openai-community/gpt2/tree/main/onnx")
                .header("user-agent", "ModelPackagingTool/1.0");
            then.status(200).header("content-type", "application/json").body(
                json!([
                    {"type": "file", "path": "onnx/model.onnx", "size": 7},
                    {"type": "file", "path": "onnx/config.json", "size": 2},
                    {"type": "directory", "path": "onnx/extra", "size": 0},
                    {"type": "file", "path": "onnx/extra/nested.bin", "size": 6}
                ])
                .to_string(),
            );
        })
        .await;
    let model = server
        .mock_async(|when, then| {
            when.method(GET).path("/openai-community/gpt2/resolve/main/onnx/model.onnx");
            then.status(200).body("weights");
        })
        .await;
    let config = server
        .mock_async(|when, then| {
            when.method(GET).path("/openai-community/gpt2/resolve/main/onnx/config.json");
            then.status(200).body("{}");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let mut names = Vec::new();
    let outcome = acquirer(&server)
        .acquire(
            "https://huggingface.co/openai-community/gpt2/tree/main/onnx",
            temp.path(),
            &mut |progress: &DownloadProgress| {
                if names.last() != Some(&progress.file_name) {
                    names.push(progress.file_name.clone());
                }
            },
        )
        .await;

    listing.assert_async().await;
    model.assert_async().await;
    config.assert_async().await;

    match outcome {
        AcquisitionOutcome::Completed {
            files,
        } => assert_eq!(files, vec![temp.path().join("model.onnx"), temp.path().join("config.json")]),
        other => panic!("Expected Completed, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(temp.path().join("model.onnx")).unwrap(), "weights");
    assert!(!temp.path().join("nested.bin").exists());
    assert_eq!(names, vec!["model.onnx".to_string(), "config.json".to_string()]);
}

#[tokio::test]
async fn test_github_repository_root_uses_tree_api() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/microsoft/onnxruntime/git/trees/main")
                .query_param("recursive", "1");
            then.status(200).header("content-type", "application/json").body(
                json!({
                    "sha": "abc",
                    "truncated": false,
                    "tree": [
                        {"path": "README.md", "type": "blob"},
                        {"path": "docs", "type": "tree"},
                        {"path": "docs/guide.md", "type": "blob"}
                    ]
                })
                .to_string(),
            );
        })
        .await;
    let readme = server
        .mock_async(|when, then| {
            when.method(GET).path("/microsoft/onnxruntime/main/README.md");
            then.status(200).body("# onnxruntime");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = acquirer(&server)
        .acquire("https://github.com/microsoft/onnxruntime", temp.path(), &mut |_: &DownloadProgress| {})
        .await;

    listing.assert_async().await;
    readme.assert_async().await;
    assert_eq!(outcome.files(), &[temp.path().join("README.md")]);
    assert!(!temp.path().join("guide.md").exists());
}

#[tokio::test]
async fn test_github_blob_downloads_single_file() {
    let server = MockServer::start_async().await;
    let file = server
        .mock_async(|when, then| {
            when.method(GET).path("/owner/repo/dev/models/tiny.onnx");
            then.status(200).body("tiny");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = acquirer(&server)
        .acquire(
            "https://github.com/owner/repo/blob/dev/models/tiny.onnx",
            temp.path(),
            &mut |_: &DownloadProgress| {},
        )
        .await;

    file.assert_async().await;
    assert!(matches!(outcome, AcquisitionOutcome::Completed { .. }));
    assert_eq!(std::fs::read(temp.path().join("tiny.onnx")).unwrap(), b"tiny");
}

#[tokio::test]
async fn test_failed_file_gives_partial_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/org/model/tree/main");
            then.status(200).header("content-type", "application/json").body(
                json!([
                    {"type": "file", "path": "a.bin", "size": 1},
                    {"type": "file", "path": "b.bin", "size": 1},
                    {"type": "file", "path": "c.bin", "size": 1}
                ])
                .to_string(),
            );
        })
        .await;
    for name in ["a.bin", "c.bin"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/org/model/resolve/main/{name}"));
                then.status(200).body(name);
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(GET).path("/org/model/resolve/main/b.bin");
            then.status(404);
        })
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = acquirer(&server)
        .acquire("https://huggingface.co/org/model", temp.path(), &mut |_: &DownloadProgress| {})
        .await;

    match outcome {
        AcquisitionOutcome::PartialFailure {
            files,
            failed,
        } => {
            assert_eq!(files, vec![temp.path().join("a.bin"), temp.path().join("c.bin")]);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].path, "b.bin");
            assert!(matches!(failed[0].error, ModelpackError::DownloadFailed { .. }));
        }
        other => panic!("Expected PartialFailure, got {other:?}"),
    }
    assert!(!temp.path().join("b.bin").exists());
}

#[tokio::test]
async fn test_listing_error_fails_run() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/org/missing/tree/main");
            then.status(404).body("Repository not found");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let outcome = acquirer(&server)
        .acquire("https://huggingface.co/org/missing", temp.path(), &mut |_: &DownloadProgress| {})
        .await;

    match outcome {
        AcquisitionOutcome::Failed {
            phase,
            error,
        } => {
            assert_eq!(phase, AcquisitionPhase::Listing);
            assert!(matches!(error, ModelpackError::ListingFailed { .. }));
        }
        other => panic!("Expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_token_aborts_without_requests() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/org/model/tree/main/onnx");
            then.status(200).body("[]");
        })
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let temp = TempDir::new().unwrap();
    let outcome = acquirer(&server)
        .acquire_with_token(
            "https://huggingface.co/org/model/tree/main/onnx",
            temp.path(),
            &mut |_: &DownloadProgress| {},
            token,
        )
        .await;

    assert!(matches!(outcome, AcquisitionOutcome::Aborted { .. }));
    listing.assert_calls_async(0).await;
}

async fn mock_large_blob(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/owner/repo/main/weights.bin");
            then.status(200).body(vec![7u8; LARGE_BODY_LEN]);
        })
        .await;
}

#[tokio::test]
async fn test_progress_is_monotonic_and_bounded() {
    let server = MockServer::start_async().await;
    mock_large_blob(&server).await;

    let temp = TempDir::new().unwrap();
    let mut updates: Vec<(u64, u64)> = Vec::new();
    let outcome = acquirer(&server)
        .acquire(
            "https://github.com/owner/repo/blob/main/weights.bin",
            temp.path(),
            &mut |progress: &DownloadProgress| {
                updates.push((progress.bytes_received, progress.total_bytes));
            },
        )
        .await;

    assert!(matches!(outcome, AcquisitionOutcome::Completed { .. }), "{outcome:?}");
    assert!(updates.len() > 1, "expected several chunks, got {updates:?}");
    for pair in updates.windows(2) {
        assert!(pair[0].0 <= pair[1].0, "bytes went backwards: {pair:?}");
    }
    for (received, total) in &updates {
        if *total > 0 {
            assert!(received <= total, "{received} exceeds {total}");
        }
    }
    let expected = LARGE_BODY_LEN as u64;
    assert_eq!(updates.last(), Some(&(expected, expected)));
    assert_eq!(std::fs::metadata(temp.path().join("weights.bin")).unwrap().len(), expected);
}

#[tokio::test]
async fn test_cancel_mid_transfer_stops_writing_and_aborts() {
    let server = MockServer::start_async().await;
    mock_large_blob(&server).await;

    let token = CancellationToken::new();
    let handle = token.clone();
    let temp = TempDir::new().unwrap();
    let mut callbacks = 0;
    let outcome = acquirer(&server)
        .acquire_with_token(
            "https://github.com/owner/repo/blob/main/weights.bin",
            temp.path(),
            &mut |_: &DownloadProgress| {
                callbacks += 1;
                handle.cancel();
            },
            token,
        )
        .await;

    match outcome {
        AcquisitionOutcome::Aborted {
            files,
        } => assert!(files.is_empty()),
        other => panic!("Expected Aborted, got {other:?}"),
    }
    assert_eq!(callbacks, 1);
    assert!(!temp.path().join("weights.bin").exists());
}

#[tokio::test]
async fn test_acquirer_cancel_skips_remaining_files() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/org/model/tree/main");
            then.status(200).header("content-type", "application/json").body(
                json!([
                    {"type": "file", "path": "a.bin", "size": 4},
                    {"type": "file", "path": "b.bin", "size": 4}
                ])
                .to_string(),
            );
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/org/model/resolve/main/a.bin");
            then.status(200).body("aaaa");
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET).path("/org/model/resolve/main/b.bin");
            then.status(200).body("bbbb");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let runner = acquirer(&server);
    let outcome = runner
        .acquire("https://huggingface.co/org/model", temp.path(), &mut |progress: &DownloadProgress| {
            // Cancel once the first file has fully arrived
            if progress.file_name == "a.bin" && progress.bytes_received == 4 {
                runner.cancel();
            }
        })
        .await;

    first.assert_async().await;
    second.assert_calls_async(0).await;
    match outcome {
        AcquisitionOutcome::Aborted {
            files,
        } => assert_eq!(files, vec![temp.path().join("a.bin")]),
        other => panic!("Expected Aborted, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(temp.path().join("a.bin")).unwrap(), "aaaa");
    assert!(!temp.path().join("b.bin").exists());
}
