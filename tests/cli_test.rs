// Integration tests for the zmqcat binary
//
// These tests verify that:
// 1. Usage errors exit with EX_USAGE (64) before any socket is created
// 2. Setup failures exit with EX_UNAVAILABLE (69)
// 3. A REQ process and a REP process complete one exchange end to end
// 4. -e and -n replace stdin as the payload source
// 5. Environment overrides apply only when the flag is absent
//
// Run with: cargo test --test cli_test

use std::io::Write;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

const EX_USAGE: i32 = 64;
const EX_UNAVAILABLE: i32 = 69;
const EX_IOERR: i32 = 74;

fn zmqcat() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zmqcat"))
}

fn ipc_endpoint(dir: &TempDir) -> String {
    format!("ipc://{}", dir.path().join("cli.sock").display())
}

/// Wait for process to exit with timeout
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    return None;
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(_) => return None,
        }
    }
}

/// Spawns a process with piped stdio, writes `input` to its stdin (or
/// closes it immediately), and collects its output within `timeout`.
fn run_with_input(mut cmd: Command, input: &[u8], timeout: Duration) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn zmqcat");

    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input).unwrap();
    }

    let status = wait_with_timeout(&mut child, timeout);
    assert!(status.is_some(), "zmqcat did not exit within {:?}", timeout);
    child.wait_with_output().unwrap()
}

#[test]
fn test_help_exits_successfully() {
    let output = zmqcat().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "help should print usage: {stdout}");
}

#[test]
fn test_missing_transport_is_usage_error() {
    let output = zmqcat().output().unwrap();
    assert_eq!(output.status.code(), Some(EX_USAGE));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_transport_scheme_is_usage_error() {
    let output = zmqcat().arg("udp://127.0.0.1:5555").output().unwrap();
    assert_eq!(output.status.code(), Some(EX_USAGE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ipc://"), "stderr should explain the scheme: {stderr}");
}

#[test]
fn test_invalid_role_is_usage_error() {
    let output = zmqcat()
        .args(["-t", "PUB", "tcp://127.0.0.1:5555"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_USAGE));
}

#[test]
fn test_bind_failure_is_unavailable() {
    let output = zmqcat()
        .args(["-t", "REP", "-n", "tcp://256.1.1.1:5555"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_UNAVAILABLE));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_failing_exec_is_io_error() {
    let output = zmqcat()
        .args(["-e", "exit 7", "tcp://127.0.0.1:5555"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_IOERR));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_two_process_exchange() {
    let dir = TempDir::new().unwrap();
    let endpoint = ipc_endpoint(&dir);

    let mut replier = zmqcat()
        .args(["-t", "rep", "-e", "printf pong", &endpoint])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut requester = zmqcat();
    requester.args(["-t", "REQ", &endpoint]);
    let req_output = run_with_input(requester, b"ping", Duration::from_secs(10));

    let rep_status = wait_with_timeout(&mut replier, Duration::from_secs(10));
    assert!(rep_status.is_some(), "replier did not exit");
    let rep_output = replier.wait_with_output().unwrap();

    assert!(req_output.status.success(), "requester failed: {:?}", req_output);
    assert!(rep_output.status.success(), "replier failed: {:?}", rep_output);
    assert_eq!(req_output.stdout, b"pong");
    assert_eq!(rep_output.stdout, b"ping");
}

#[test]
fn test_verbose_diagnostics_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let endpoint = ipc_endpoint(&dir);

    let mut replier = zmqcat()
        .args(["-t", "REP", "-v", "-e", "printf reply", &endpoint])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut requester = zmqcat();
    requester.args(["-v", "-n", &endpoint]);
    let req_output = run_with_input(requester, b"", Duration::from_secs(10));

    assert!(wait_with_timeout(&mut replier, Duration::from_secs(10)).is_some());
    let rep_output = replier.wait_with_output().unwrap();

    assert!(req_output.status.success());
    assert_eq!(req_output.stdout, b"reply");
    assert!(rep_output.stdout.is_empty(), "empty request yields empty output");
    let stderr = String::from_utf8_lossy(&req_output.stderr);
    assert!(stderr.contains("[bridge]"), "verbose output expected on stderr: {stderr}");
}

/// Runs a verbose process whose `-e` command fails before any socket is
/// created, returning its stderr. The resolved configuration is logged first.
fn resolved_config_stderr(cmd: &mut Command) -> String {
    let output = cmd
        .args(["-v", "-e", "exit 7"])
        .arg("tcp://127.0.0.1:5555")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_IOERR));
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_env_timeout_applies_without_flag() {
    let stderr = resolved_config_stderr(zmqcat().env("ZMQCAT_POLL_TIMEOUT_MS", "1500"));
    assert!(stderr.contains("After(1.5s)"), "env timeout should apply: {stderr}");
}

#[test]
fn test_timeout_flag_wins_over_env() {
    let stderr = resolved_config_stderr(
        zmqcat()
            .env("ZMQCAT_POLL_TIMEOUT_MS", "1500")
            .args(["-w", "250"]),
    );
    assert!(stderr.contains("After(250ms)"), "flag should win: {stderr}");
    assert!(!stderr.contains("1.5s"), "env value should be ignored: {stderr}");
}

#[test]
fn test_env_linger_applies_without_flag() {
    let stderr = resolved_config_stderr(zmqcat().env("ZMQCAT_LINGER_MS", "42"));
    assert!(stderr.contains("linger: 42ms"), "env linger should apply: {stderr}");
}

#[test]
fn test_unparseable_env_is_usage_error() {
    let output = zmqcat()
        .env("ZMQCAT_POLL_TIMEOUT_MS", "abc")
        .args(["-n", "tcp://127.0.0.1:5555"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_USAGE));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ZMQCAT_POLL_TIMEOUT_MS"), "stderr should name the variable: {stderr}");
    assert!(stderr.contains("Usage"), "stderr should carry a usage synopsis: {stderr}");
}

#[test]
fn test_non_utf8_env_is_usage_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let output = zmqcat()
        .env("ZMQCAT_LINGER_MS", OsStr::from_bytes(b"\xff12"))
        .args(["-n", "tcp://127.0.0.1:5555"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(EX_USAGE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ZMQCAT_LINGER_MS"), "stderr should name the variable: {stderr}");
}
