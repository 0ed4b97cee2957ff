// tests/build_pipeline.rs

use std::fs;
use std::sync::Arc;

use htmlsplice::build::{execute_build, ArtifactSink, BuildContext, SinkTarget, DEFAULT_TEMPLATE};
use htmlsplice::errors::SpliceError;
use htmlsplice::fs::{FileSystem, RealFileSystem};
use htmlsplice::reload::reload_snippet;
use htmlsplice_test_utils::init_tracing;
use tempfile::tempdir;

fn context(input: &std::path::Path, out: &std::path::Path, snippet: Option<String>) -> BuildContext {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let sink = Arc::new(ArtifactSink::new(SinkTarget::File(out.to_path_buf()), false));
    sink.prepare().unwrap();
    BuildContext {
        input_dir: input.to_path_buf(),
        fs,
        sink,
        reload_snippet: snippet,
    }
}

#[test]
fn one_shot_build_inlines_css_before_js() {
    init_tracing();
    let dir = tempdir().unwrap();
    let input = dir.path().join("web");
    fs::create_dir_all(input.join("nested")).unwrap();
    fs::write(input.join("a.css"), "body{}").unwrap();
    fs::write(input.join("nested/b.js"), "go();").unwrap();
    fs::write(input.join("notes.txt"), "skip me").unwrap();

    let out = dir.path().join("dist/deep/index.html");
    let ctx = context(&input, &out, None);

    let bytes = execute_build(&ctx, DEFAULT_TEMPLATE).unwrap();
    let html = fs::read_to_string(&out).unwrap();
    assert_eq!(bytes, html.len());

    let css = html.find(r#"<style type="text/css">body{}</style>"#).unwrap();
    let js = html
        .find(r#"<script type="text/javascript">go();</script>"#)
        .unwrap();
    assert!(css < js);
    assert!(!html.contains("skip me"));
}

#[test]
fn rebuilding_unchanged_inputs_is_byte_identical() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("web");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.css"), "a{}").unwrap();
    fs::write(input.join("b.js"), "b();").unwrap();
    let out = dir.path().join("index.html");
    let ctx = context(&input, &out, None);

    execute_build(&ctx, DEFAULT_TEMPLATE).unwrap();
    let first = fs::read(&out).unwrap();
    execute_build(&ctx, DEFAULT_TEMPLATE).unwrap();
    assert_eq!(first, fs::read(&out).unwrap());
}

#[test]
fn invalid_template_leaves_previous_artifact_untouched() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("web");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.css"), "a{}").unwrap();
    let out = dir.path().join("index.html");
    let ctx = context(&input, &out, None);

    execute_build(&ctx, DEFAULT_TEMPLATE).unwrap();
    let before = fs::read(&out).unwrap();

    let err = execute_build(&ctx, "<html>{{.Nope}}</html>").unwrap_err();
    assert!(matches!(err, SpliceError::TemplateError(_)), "{err:?}");
    assert_eq!(before, fs::read(&out).unwrap());
}

#[test]
fn reload_snippet_is_appended_inside_the_script_element() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("web");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("app.js"), "app();").unwrap();
    let out = dir.path().join("index.html");

    let snippet = reload_snippet(8082, "/hotreload");
    let ctx = context(&input, &out, Some(snippet.clone()));
    execute_build(&ctx, "{{.Javascript}}").unwrap();

    let html = fs::read_to_string(&out).unwrap();
    let expected = format!(r#"<script type="text/javascript">app();{snippet}</script>"#);
    assert_eq!(html, expected);
    assert!(snippet.contains("ws://localhost:8082/hotreload"));
}

#[test]
fn missing_input_dir_fails_without_creating_artifact() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("index.html");
    let ctx = context(&dir.path().join("absent"), &out, None);

    assert!(execute_build(&ctx, DEFAULT_TEMPLATE).is_err());
    assert!(!out.exists());
}

#[cfg(unix)]
#[test]
fn artifact_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let input = dir.path().join("web");
    fs::create_dir_all(&input).unwrap();
    let out = dir.path().join("index.html");
    let ctx = context(&input, &out, None);

    execute_build(&ctx, DEFAULT_TEMPLATE).unwrap();
    let mode = fs::metadata(&out).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
