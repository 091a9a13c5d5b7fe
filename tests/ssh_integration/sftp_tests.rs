//! SFTP transfer tests

use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;

use simplyssh::sftp::{NoProgress, Progress, ProgressEvent, SftpSession};

use super::fixtures::SshTestEnvironment;

#[tokio::test]
async fn test_download_file_reports_progress() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;
    let remote = env.remote_scratch_dir(&connection).await;
    connection
        .exec(&format!("head -c 100000 /dev/zero > {}/blob", remote))
        .await
        .expect("setup failed");

    let sftp = SftpSession::open(&connection)
        .await
        .expect("Failed to open SFTP session");
    let local = TempDir::new().unwrap();
    let target = local.path().join("nested/blob");

    let events = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let bytes = sftp
        .download_file(
            &format!("{}/blob", remote),
            &target,
            Progress::configured(&sink, env.client.settings()),
        )
        .await
        .expect("download failed");

    assert_eq!(bytes, 100_000);
    assert_eq!(fs::metadata(&target).unwrap().len(), 100_000);

    let events = events.into_inner().unwrap();
    let last_progress = events
        .iter()
        .rev()
        .find(|e| matches!(e, ProgressEvent::Progress { .. }))
        .expect("no progress events");
    assert_eq!(last_progress.percent(), Some(100.0));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Completed { bytes: 100_000, .. })
    ));

    sftp.close().await.expect("close failed");
    connection
        .exec(&format!("rm -rf {}", remote))
        .await
        .expect("cleanup failed");
    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_download_dir_mirrors_tree() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;
    let remote = env.remote_scratch_dir(&connection).await;
    let setup = format!(
        "cd {} && mkdir -p tree/sub/deeper tree/empty && echo one > tree/a.txt && \
         echo two > tree/sub/b.txt && echo three > tree/sub/deeper/c.txt",
        remote
    );
    let output = connection.exec(&setup).await.expect("setup failed");
    assert!(output.success());

    let sftp = SftpSession::open(&connection)
        .await
        .expect("Failed to open SFTP session");
    let local = TempDir::new().unwrap();
    let target = local.path().join("tree");

    let summary = sftp
        .download_dir(&format!("{}/tree", remote), &target, Progress::new(&NoProgress))
        .await
        .expect("download_dir failed");

    assert_eq!(summary.files, 3);
    assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "one\n");
    assert_eq!(fs::read_to_string(target.join("sub/b.txt")).unwrap(), "two\n");
    assert_eq!(
        fs::read_to_string(target.join("sub/deeper/c.txt")).unwrap(),
        "three\n"
    );
    assert!(target.join("empty").is_dir());

    sftp.close().await.expect("close failed");
    connection
        .exec(&format!("rm -rf {}", remote))
        .await
        .expect("cleanup failed");
    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_upload_then_download_dir() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;
    let remote = env.remote_scratch_dir(&connection).await;

    let source = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("docs")).unwrap();
    fs::write(source.path().join("notes.txt"), "remember the milk").unwrap();
    fs::write(source.path().join("docs/guide.md"), "# Guide\n").unwrap();

    let sftp = SftpSession::open(&connection)
        .await
        .expect("Failed to open SFTP session");
    let remote_dir = format!("{}/upload", remote);

    let uploaded = sftp
        .upload_dir(source.path(), &remote_dir, Progress::new(&NoProgress))
        .await
        .expect("upload_dir failed");
    assert_eq!(uploaded.files, 2);

    let listing = connection
        .exec(&format!("cat {}/docs/guide.md", remote_dir))
        .await
        .expect("cat failed");
    assert_eq!(listing.stdout_lossy(), "# Guide\n");

    let back = TempDir::new().unwrap();
    let downloaded = sftp
        .download_dir(&remote_dir, back.path(), Progress::new(&NoProgress))
        .await
        .expect("download_dir failed");
    assert_eq!(downloaded.files, 2);
    assert_eq!(downloaded.bytes, uploaded.bytes);
    assert_eq!(
        fs::read_to_string(back.path().join("notes.txt")).unwrap(),
        "remember the milk"
    );

    sftp.close().await.expect("close failed");
    connection
        .exec(&format!("rm -rf {}", remote))
        .await
        .expect("cleanup failed");
    connection.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_missing_remote_file_is_error() {
    skip_if_no_server!();
    let _guard = super::fixtures::acquire_test_lock().await;

    let env = SshTestEnvironment::new()
        .await
        .expect("Failed to create test environment");
    let connection = env.connect().await;
    let sftp = SftpSession::open(&connection)
        .await
        .expect("Failed to open SFTP session");
    let local = TempDir::new().unwrap();

    let result = sftp
        .download_file(
            "/nonexistent/simplyssh/file",
            &local.path().join("f"),
            Progress::new(&NoProgress),
        )
        .await;
    assert!(result.is_err());
    assert!(!local.path().join("f").exists());

    sftp.close().await.expect("close failed");
    connection.disconnect().await.expect("disconnect failed");
}
