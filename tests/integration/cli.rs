//! End-to-end runs of the modelpack binary

use assert_cmd::Command;
use httpmock::prelude::*;
use modelpack_cli::test_utils::{ModelFolderFixture, package_entry, package_entry_names};
use predicates::prelude::*;
use serde_json::json;

use crate::common::{FileAssert, TestProject};

#[test]
fn test_pack_infers_identity_from_folders() {
    let project = TestProject::new().unwrap();
    let publisher_dir = project.work_path().join("Contoso");
    std::fs::create_dir_all(&publisher_dir).unwrap();
    let source = ModelFolderFixture::new("MyModel")
        .with_file("model.bin", b"weights")
        .write_to(&publisher_dir)
        .unwrap();
    let out_dir = project.work_path().join("out");

    let output = project
        .run_modelpack(&["pack", source.to_str().unwrap(), "-o", out_dir.to_str().unwrap()])
        .unwrap();
    output.assert_success().assert_stdout_contains("Contoso_MyModel.msix");

    let artifact = out_dir.join("Contoso_MyModel.msix");
    FileAssert::exists(&artifact);
    FileAssert::contains(source.join("AppxManifest.xml"), "<DisplayName>MyModel Model Package</DisplayName>");
    for image in ["StoreLogo.png", "MedTile.png", "AppList.png"] {
        FileAssert::exists(source.join("Images").join(image));
    }

    let names = package_entry_names(&artifact).unwrap();
    assert_eq!(names[0], "AppxManifest.xml");
    assert_eq!(package_entry(&artifact, "model.bin").unwrap(), b"weights");
}

#[test]
fn test_pack_uses_names_and_explicit_output_file() {
    let project = TestProject::new().unwrap();
    let source = ModelFolderFixture::onnx_model("phi").write_to(project.work_path()).unwrap();

    project
        .run_modelpack(&[
            "pack",
            source.to_str().unwrap(),
            "-o",
            "dist/phi3.msix",
            "--name",
            "Phi 3",
            "--publisher",
            "Contoso Ltd",
        ])
        .unwrap()
        .assert_success();

    FileAssert::exists(project.work_path().join("dist").join("phi3.msix"));
    FileAssert::contains(source.join("AppxManifest.xml"), "Publisher=\"CN=Contoso_Ltd\"");
    FileAssert::contains(source.join("AppxManifest.xml"), "Name=\"Phi_3ModelPackage\"");
}

#[test]
fn test_pack_uses_default_publisher_from_config() {
    let project = TestProject::new().unwrap();
    project.write_config("default_publisher = \"Fabrikam\"\n").unwrap();
    let source = ModelFolderFixture::onnx_model("tiny").write_to(project.work_path()).unwrap();

    project
        .run_modelpack(&["pack", source.to_str().unwrap(), "-o", "out"])
        .unwrap()
        .assert_success();

    FileAssert::exists(project.work_path().join("out").join("Fabrikam_tiny.msix"));
}

#[test]
fn test_pack_missing_certificate_fails_before_packaging() {
    let project = TestProject::new().unwrap();
    let source = ModelFolderFixture::onnx_model("signed").write_to(project.work_path()).unwrap();

    project
        .run_modelpack(&["pack", source.to_str().unwrap(), "-o", "out", "--sign", "missing.pfx"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("missing.pfx");

    FileAssert::not_exists(source.join("AppxManifest.xml"));
    FileAssert::not_exists(project.work_path().join("out"));
}

#[test]
fn test_pack_missing_folder_fails() {
    let project = TestProject::new().unwrap();
    project
        .run_modelpack(&["pack", "does-not-exist", "-o", "out"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("does-not-exist");
}

#[test]
fn test_download_and_pack_rejects_unsupported_uri() {
    let project = TestProject::new().unwrap();
    project
        .run_modelpack(&["download-and-pack", "https://gitlab.com/owner/model", "-o", "out"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("gitlab.com");
}

#[test]
fn test_download_and_pack_from_mock_huggingface() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/models/openai-community/gpt2/tree/main/onnx");
        then.status(200).header("content-type", "application/json").body(
            json!([
                {"type": "file", "path": "onnx/decoder_model.onnx", "size": 5},
                {"type": "file", "path": "onnx/config.json", "size": 2}
            ])
            .to_string(),
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/openai-community/gpt2/resolve/main/onnx/decoder_model.onnx");
        then.status(200).body("onnx!");
    });
    server.mock(|when, then| {
        when.method(GET).path("/openai-community/gpt2/resolve/main/onnx/config.json");
        then.status(200).body("{}");
    });

    let project = TestProject::new().unwrap();
    project.write_mock_config(&server.base_url()).unwrap();

    project
        .run_modelpack(&[
            "download-and-pack",
            "https://huggingface.co/openai-community/gpt2/tree/main/onnx",
            "-o",
            "out",
            "--download-dir",
            "dl",
        ])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("Downloaded 2 file(s)");

    let artifact = project.work_path().join("out").join("openai-community_gpt2.msix");
    FileAssert::exists(&artifact);
    FileAssert::exists(project.work_path().join("dl").join("decoder_model.onnx"));

    let names = package_entry_names(&artifact).unwrap();
    assert_eq!(names[0], "AppxManifest.xml");
    assert!(names.iter().any(|n| n == "decoder_model.onnx"));
    assert!(names.iter().any(|n| n == "config.json"));
}

#[test]
fn test_download_listing_failure_exits_non_zero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/owner/gone/git/trees/main");
        then.status(404);
    });

    let project = TestProject::new().unwrap();
    project.write_mock_config(&server.base_url()).unwrap();

    project
        .run_modelpack(&["download", "https://github.com/owner/gone/tree/main/models", "-o", "dl"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("owner/gone");
}

#[test]
fn test_config_init_and_path() {
    let project = TestProject::new().unwrap();

    Command::cargo_bin("modelpack")
        .unwrap()
        .env("MODELPACK_CONFIG", project.config_path())
        .env("NO_COLOR", "1")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    Command::cargo_bin("modelpack")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["--config", project.config_path().to_str().unwrap(), "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("huggingface_endpoint"));

    FileAssert::contains(project.config_path(), "user_agent = \"ModelPackagingTool/1.0\"");
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("modelpack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download-and-pack"))
        .stdout(predicate::str::contains("pack"));
}
