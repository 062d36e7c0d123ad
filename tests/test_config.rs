use gridline::config::Config;
use gridline::http::io::{DEFAULT_MAX_HEADER, DEFAULT_MAX_LINE};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.max_line_length, DEFAULT_MAX_LINE);
    assert_eq!(cfg.max_header_bytes, DEFAULT_MAX_HEADER);
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml_str(
        "listen_addr: 0.0.0.0:3000\nmax_line_length: 1024\nmax_header_bytes: 16384\n",
    )
    .unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.max_line_length, 1024);
    assert_eq!(cfg.max_header_bytes, 16384);
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("max_line_length: 512\n").unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.max_line_length, 512);
}

#[test]
fn test_config_rejects_bad_yaml() {
    assert!(Config::from_yaml_str("max_line_length: lots\n").is_err());
}

#[test]
fn test_config_missing_file() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/gridline.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

// The environment is process-wide, so every case touching it lives in this
// one test.
#[test]
fn test_config_load_from_env() {
    let path = std::env::temp_dir().join(format!("gridline-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "listen_addr: 127.0.0.1:9000\nmax_line_length: 2048\n").unwrap();

    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("GRIDLINE_CONFIG");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");

    unsafe {
        std::env::set_var("GRIDLINE_CONFIG", &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.max_line_length, 2048);

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.max_line_length, 2048);

    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("GRIDLINE_CONFIG");
    }
    let _ = std::fs::remove_file(&path);
}
