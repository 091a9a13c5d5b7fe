//! SSH connection and command tests

use std::path::PathBuf;

use simplyssh::error::SshError;

use super::fixtures::SshTestEnvironment;

#[tokio::test]
async fn test_key_auth_and_exec() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;

    let output = connection.exec("echo hello").await.expect("exec failed");
    assert!(output.success());
    assert_eq!(output.stdout_lossy(), "hello\n");

    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_connect_host_record() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let record = env.server.host_record("test");

    let connection = env
        .client
        .connect_host(&record, Some(&env.server.private_key_path), None)
        .await
        .expect("connect_host failed");
    assert_eq!(connection.username(), env.server.username);

    let mut out = Vec::new();
    connection
        .run_command("whoami", &mut out)
        .await
        .expect("whoami failed");
    assert_eq!(String::from_utf8_lossy(&out).trim(), env.server.username);

    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_failing_command_writes_output_then_errors() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;

    let mut out = Vec::new();
    let err = connection
        .run_command("echo partial; exit 3", &mut out)
        .await
        .unwrap_err();

    assert_eq!(out, b"partial\n");
    match err {
        SshError::CommandFailed { reason, output, .. } => {
            assert_eq!(reason, "exit status 3");
            assert_eq!(output, b"partial\n");
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }

    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_stderr_is_captured_separately() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;

    let output = connection
        .exec("echo out; echo err >&2")
        .await
        .expect("exec failed");
    assert_eq!(output.stdout, b"out\n");
    assert_eq!(output.stderr, b"err\n");

    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_unauthorized_key_is_rejected() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");

    // Throwaway key that no server has in authorized_keys
    let key = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keys/id_ed25519");
    let result = env
        .client
        .connect(
            &env.server.host,
            env.server.port,
            &env.server.username,
            Some(&key),
            None,
        )
        .await;

    assert!(
        matches!(result, Err(SshError::AuthenticationFailed(_))),
        "expected AuthenticationFailed, got {:?}",
        result
    );
}
