mod common;

use std::path::Path;
use std::time::Duration;

use common::{dir_names, Capture};
use tierlog::{Encoding, Level, Logger, LoggerBuilder, SinkTarget, fields};

fn read_active(dir: &Path, link: &str) -> String {
    let name = dir_names(dir)
        .into_iter()
        .find(|name| name.starts_with(&format!("{}.", link)))
        .unwrap_or_else(|| panic!("no active file for {}", link));
    std::fs::read_to_string(dir.join(name)).unwrap()
}

fn has_file(dir: &Path, link: &str) -> bool {
    dir_names(dir)
        .iter()
        .any(|name| name.starts_with(&format!("{}.", link)))
}

#[test]
fn test_one_file_per_level_after_first_write() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().join("log");

    let mut logger = Logger::new();
    logger
        .set_level(Level::Debug)
        .set_output_file(&dir, Some("demo"));
    logger.init_logger();
    assert!(dir.is_dir());

    logger.debug(&[&"d"]);
    logger.info(&[&"i"]);
    logger.warn(&[&"w"]);
    logger.error(&[&"e"]);
    logger.flush().unwrap();

    for link in ["demo_debug.log", "demo_info.log", "demo_warn.log", "demo_err.log"] {
        assert!(has_file(&dir, link), "missing {}", link);
    }
}

#[test]
fn test_files_are_created_lazily() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let mut logger = Logger::new();
    logger
        .set_level(Level::Debug)
        .set_output_file(tmp.path(), Some("demo"));
    logger.init_logger();
    assert!(dir_names(tmp.path()).is_empty());

    logger.info(&[&"only info"]);
    logger.flush().unwrap();

    assert!(has_file(tmp.path(), "demo_debug.log"));
    assert!(has_file(tmp.path(), "demo_info.log"));
    assert!(!has_file(tmp.path(), "demo_warn.log"));
    assert!(!has_file(tmp.path(), "demo_err.log"));
}

#[test]
fn test_records_reach_every_floor_they_clear() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let logger = LoggerBuilder::new()
        .with_level(Level::Debug)
        .with_encoding(Encoding::Json)
        .with_output_file(tmp.path(), None)
        .build()
        .unwrap();

    logger.debug(&[&"m-debug"]);
    logger.info(&[&"m-info"]);
    logger.warn(&[&"m-warn"]);
    logger.error(&[&"m-error"]);
    logger.flush().unwrap();

    let expectations = [
        ("access.log", ["m-debug", "m-info", "m-warn", "m-error"].as_slice()),
        ("info.log", ["m-info", "m-warn", "m-error"].as_slice()),
        ("warn.log", ["m-warn", "m-error"].as_slice()),
        ("error.log", ["m-error"].as_slice()),
    ];
    for (link, messages) in expectations {
        let content = read_active(tmp.path(), link);
        let found: Vec<String> = content
            .lines()
            .map(|line| {
                let record: serde_json::Value = serde_json::from_str(line).unwrap();
                record["msg"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(found, messages, "contents of {}", link);
    }
}

#[test]
fn test_level_suppresses_lower_file_sinks() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let logger = LoggerBuilder::new()
        .with_level(Level::Warn)
        .with_output_file(tmp.path(), Some("svc"))
        .build()
        .unwrap();

    let floors: Vec<Level> = logger.sinks().iter().map(|s| s.floor).collect();
    assert_eq!(floors, [Level::Warn, Level::Error]);

    logger.info(&[&"dropped"]);
    logger.error(&[&"kept"]);
    logger.flush().unwrap();

    assert_eq!(
        dir_names(tmp.path())
            .iter()
            .filter(|n| n.starts_with("svc_"))
            .filter(|n| !n.ends_with("_symlink"))
            .count(),
        if cfg!(unix) { 4 } else { 2 }
    );
    assert!(read_active(tmp.path(), "svc_warn.log").contains("kept"));
    assert!(!read_active(tmp.path(), "svc_warn.log").contains("dropped"));
}

#[test]
fn test_console_sink_alongside_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let capture = Capture::default();
    let logger = LoggerBuilder::new()
        .with_output_file(tmp.path(), Some("app"))
        .with_console(true)
        .with_console_writer(capture.clone())
        .build()
        .unwrap();

    assert_eq!(logger.sinks().last().map(|s| &s.target), Some(&SinkTarget::Console));

    logger.warn_with_fields(fields! { "disk" => "/var" }, "usage %d%%", &[&91]);
    logger.flush().unwrap();

    assert!(capture.contents().contains("usage 91%"));
    assert!(read_active(tmp.path(), "app_info.log").contains("usage 91%"));
    assert!(read_active(tmp.path(), "app_warn.log").contains(r#"{"disk":"/var"}"#));
}

#[test]
fn test_file_output_has_no_ansi_escapes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let logger = LoggerBuilder::new()
        .with_encoding(Encoding::Text)
        .with_output_file(tmp.path(), None)
        .build()
        .unwrap();

    logger.error(&[&"file-logging-test: no-ansi"]);
    logger.flush().unwrap();

    for link in ["info.log", "warn.log", "error.log"] {
        let content = read_active(tmp.path(), link);
        assert!(content.contains("file-logging-test: no-ansi"));
        assert!(!content.contains('\x1b'), "ANSI escape found in {}", link);
    }
}

#[test]
fn test_daily_and_minute_file_suffixes() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let daily = LoggerBuilder::new()
        .with_output_file(tmp.path(), Some("daily"))
        .build()
        .unwrap();
    let minutely = LoggerBuilder::new()
        .with_output_file(tmp.path(), Some("minutely"))
        .with_file_rotate(Duration::ZERO, Duration::from_secs(3600))
        .build()
        .unwrap();

    daily.error(&[&"d"]);
    minutely.error(&[&"m"]);

    let names = dir_names(tmp.path());
    let suffix_len = |prefix: &str| {
        names
            .iter()
            .find(|n| n.starts_with(prefix) && n.ends_with(".log") && n.len() > prefix.len() + 4)
            .map(|n| n.len() - prefix.len() - ".log".len())
            .unwrap()
    };
    assert_eq!(suffix_len("daily_err.log."), "20261019".len());
    assert_eq!(suffix_len("minutely_err.log."), "202610190830".len());
}

#[cfg(unix)]
#[test]
fn test_link_points_at_active_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let logger = LoggerBuilder::new()
        .with_output_file(tmp.path(), Some("linked"))
        .build()
        .unwrap();

    logger.error(&[&"through the link"]);
    logger.flush().unwrap();

    let link = tmp.path().join("linked_err.log");
    let meta = std::fs::symlink_metadata(&link).unwrap();
    assert!(meta.file_type().is_symlink());
    assert!(std::fs::read_to_string(&link).unwrap().contains("through the link"));
}
