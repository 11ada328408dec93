//! Integration tests for `javite dev` shutdown.
//!
//! These tests verify:
//! - The hot file is written once the server listens
//! - SIGTERM, SIGINT and SIGHUP remove it and exit with 128 + signal number

#![cfg(unix)]

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn javite_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_javite"))
}

/// Kills the server if a test bails out early.
struct Server(Child);

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn spawn_dev(root: &Path, port: u16) -> Server {
    std::fs::write(
        root.join("javite.config.json"),
        format!(r#"{{ "java": "src/main.ts", "server": {{ "host": "127.0.0.1", "port": {port} }} }}"#),
    )
    .unwrap();

    let child = javite_bin()
        .args(["dev", "--cwd"])
        .arg(root)
        .env_remove("VITE_PORT")
        .env_remove("ASSET_URL")
        .env_remove("APP_URL")
        .env_remove("VITE_DEV_SERVER_KEY")
        .env_remove("VITE_DEV_SERVER_CERT")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn javite dev");
    Server(child)
}

fn wait_for_hot_file(server: &mut Server, hot: &Path) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while !hot.exists() {
        if let Some(status) = server.0.try_wait().unwrap() {
            panic!("javite dev exited early with {status}");
        }
        assert!(Instant::now() < deadline, "hot file never appeared");
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn assert_signal_cleans_hot_file(signal: &str, expected_code: i32) {
    let dir = tempdir().unwrap();
    let port = free_port();
    let hot = dir.path().join("public/hot");

    let mut server = spawn_dev(dir.path(), port);
    wait_for_hot_file(&mut server, &hot);
    assert_eq!(
        std::fs::read_to_string(&hot).unwrap(),
        format!("http://127.0.0.1:{port}")
    );

    let killed = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(server.0.id().to_string())
        .status()
        .unwrap();
    assert!(killed.success());

    let status = server.0.wait().unwrap();
    assert_eq!(status.code(), Some(expected_code));
    assert!(!hot.exists(), "hot file left behind after SIG{signal}");
}

#[test]
fn test_sigterm_removes_hot_file() {
    assert_signal_cleans_hot_file("TERM", 143);
}

#[test]
fn test_sigint_removes_hot_file() {
    assert_signal_cleans_hot_file("INT", 130);
}

#[test]
fn test_sighup_removes_hot_file() {
    assert_signal_cleans_hot_file("HUP", 129);
}
