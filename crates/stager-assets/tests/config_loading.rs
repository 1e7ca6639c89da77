use std::env;
use std::fs;
use std::path::PathBuf;

use stager_assets::{AssetError, ConfigLoader, TransportKind};
use tempfile::TempDir;

const DOCUMENT: &str = r#"{
    "root_path": "/opt/deploy",
    "assets_cache_path": "",
    "ftp_config": {"host": "ftp.example.org", "user": "deploy", "pass": "secret"},
    "asset_catalog": {
        "pkgA": {"url": "http://x/test.zip", "type": "zip", "destination": "appA"},
        "front": {
            "url": "ftp://ftp.example.org/distr/Setup.Front.exe",
            "type": "file",
            "destination": "installers",
            "download_method": "ftp"
        }
    }
}"#;

#[test]
fn test_load_from_file_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, DOCUMENT).unwrap();

    let loader = ConfigLoader::new(false);
    let config = loader.load(path.to_str().unwrap()).unwrap();

    assert_eq!(config.root_path, PathBuf::from("/opt/deploy"));
    assert_eq!(config.assets_cache_path, loader.default_cache_dir());
    assert_eq!(config.asset_catalog.len(), 2);
    assert_eq!(
        config.asset_catalog.resolve("pkgA").unwrap().transport,
        TransportKind::Http
    );
}

#[test]
fn test_load_errors_are_config_errors() {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(false);

    let missing = temp_dir.path().join("missing.json");
    assert!(matches!(
        loader.load(missing.to_str().unwrap()),
        Err(AssetError::Config(_))
    ));

    let invalid = temp_dir.path().join("invalid.json");
    fs::write(&invalid, "{\"root_path\": 42}").unwrap();
    assert!(matches!(
        loader.load(invalid.to_str().unwrap()),
        Err(AssetError::Config(_))
    ));
}

// The only test in this binary touching the environment
#[test]
fn test_environment_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, DOCUMENT).unwrap();

    env::set_var("STAGER_ROOT_PATH", "/srv/stage");
    env::set_var("STAGER_CACHE_DIR", "/srv/cache");
    env::set_var("STAGER_FTP_PASS", "rotated");

    let with_env = ConfigLoader::new(true).load(path.to_str().unwrap()).unwrap();
    let without_env = ConfigLoader::new(false).load(path.to_str().unwrap()).unwrap();

    env::remove_var("STAGER_ROOT_PATH");
    env::remove_var("STAGER_CACHE_DIR");
    env::remove_var("STAGER_FTP_PASS");

    assert_eq!(with_env.root_path, PathBuf::from("/srv/stage"));
    assert_eq!(with_env.assets_cache_path, PathBuf::from("/srv/cache"));
    assert_eq!(with_env.ftp.pass, "rotated");
    assert_eq!(with_env.ftp.user, "deploy");

    assert_eq!(without_env.root_path, PathBuf::from("/opt/deploy"));
    assert_eq!(without_env.ftp.pass, "secret");
}
