//! End-to-end update runs against a mocked release server.
#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use factorio_updater::config::UpdaterConfig;
use factorio_updater::probe::VersionProbe;
use factorio_updater::updater::{Stage, UpdateOrchestrator, UpdateOutcome, UpdatePlan, UpdateState};
use factorio_updater::version::{InstalledVersion, Version};
use httpmock::prelude::*;
use httpmock::Mock;
use tempfile::TempDir;
use xz2::write::XzEncoder;

const METADATA_PATH: &str = "/api/latest-releases";
const DOWNLOAD_PATH: &str = "/get-download/stable/headless/linux64";

fn server_script(version: &str) -> String {
    format!(
        "#!/bin/sh\necho 'Version: {} (build 1, linux64, headless)'\n",
        version
    )
}

fn release_archive(version: &str) -> Vec<u8> {
    let script = server_script(version);
    let entries: [(&str, &[u8]); 3] = [
        ("factorio/bin/x64/factorio", script.as_bytes()),
        ("factorio/data/base/info.json", "{}".as_bytes()),
        ("factorio/config-path.cfg", "config-path=__PATH__executable__/../../config".as_bytes()),
    ];

    let mut builder = tar::Builder::new(XzEncoder::new(Vec::new(), 1));
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Lay out an installed server reporting `version`, with a save game.
fn install_server(root: &Path, version: &str) {
    let bin = root.join("factorio/bin/x64");
    fs::create_dir_all(&bin).unwrap();
    let exe = bin.join("factorio");
    fs::write(&exe, server_script(version)).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    let saves = root.join("factorio/saves");
    fs::create_dir_all(&saves).unwrap();
    fs::write(saves.join("world.zip"), b"precious save").unwrap();
    fs::write(root.join("factorio/old-release-only.txt"), b"stale").unwrap();
}

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let rel = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            let content = entry
                .file_type()
                .is_file()
                .then(|| fs::read(entry.path()).unwrap());
            (rel, content)
        })
        .collect()
}

fn serve_metadata<'a>(server: &'a MockServer, version: &str) -> Mock<'a> {
    let body = format!(r#"{{"stable":{{"alpha":"9.9.9","headless":"{}"}}}}"#, version);
    server.mock(move |when, then| {
        when.method(GET).path(METADATA_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

fn serve_artifact(server: &MockServer, bytes: Vec<u8>) -> Mock<'_> {
    server.mock(move |when, then| {
        when.method(GET).path(DOWNLOAD_PATH);
        then.status(200).body(bytes);
    })
}

fn updater_for(server: &MockServer, root: &Path) -> UpdateOrchestrator {
    let config = UpdaterConfig {
        metadata_url: server.url(METADATA_PATH),
        download_url: server.url(DOWNLOAD_PATH),
        ..UpdaterConfig::for_root(root)
    };
    UpdateOrchestrator::new(config).unwrap()
}

fn position(history: &[UpdateState], state: UpdateState) -> usize {
    history
        .iter()
        .position(|s| *s == state)
        .unwrap_or_else(|| panic!("{:?} not in {:?}", state, history))
}

#[test]
fn fresh_install_never_asks_about_backup() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    let mut updater = updater_for(&server, temp.path());

    let mut asked = 0;
    let mut decision = |_: &UpdatePlan| {
        asked += 1;
        false
    };
    let outcome = updater.run(&mut decision);

    assert_eq!(outcome.to_string(), "installed");
    assert_eq!(asked, 0);
    download.assert_hits(1);

    let UpdateOutcome::Installed {
        previous,
        version,
        backup,
        artifact,
    } = &outcome
    else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(*previous, InstalledVersion::Unknown);
    assert_eq!(*version, Version::new(1, 2, 3));
    assert!(backup.is_none());
    assert!(artifact
        .path
        .to_string_lossy()
        .ends_with("factorio-headless_linux_1.2.3.tar.xz"));

    assert_eq!(
        updater.history(),
        &[
            UpdateState::Idle,
            UpdateState::ProbedLocal,
            UpdateState::ProbedRemote,
            UpdateState::Decided {
                update_needed: true
            },
            UpdateState::BackedUp { skipped: true },
            UpdateState::Downloaded,
            UpdateState::Installed,
        ]
    );

    let probed = VersionProbe::new(temp.path().join("factorio/bin/x64/factorio"))
        .probe()
        .unwrap();
    assert_eq!(probed, InstalledVersion::Known(Version::new(1, 2, 3)));
}

#[test]
fn up_to_date_runs_download_nothing() {
    let server = MockServer::start();
    let metadata = serve_metadata(&server, "1.2.3");
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.2.3");
    let before = snapshot(temp.path());
    let mut updater = updater_for(&server, temp.path());

    for _ in 0..2 {
        let outcome = updater.run(&mut true);
        assert_eq!(outcome.to_string(), "up-to-date");
    }

    metadata.assert_hits(2);
    download.assert_hits(0);
    assert_eq!(snapshot(temp.path()), before);
    assert!(!temp.path().join("Backups").exists());
}

#[test]
fn newer_local_build_counts_as_up_to_date() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.3.0");

    let outcome = updater_for(&server, temp.path()).run(&mut true);

    assert_eq!(outcome.to_string(), "up-to-date");
    download.assert_hits(0);
}

#[test]
fn metadata_failure_changes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(METADATA_PATH);
        then.status(500);
    });
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    let before = snapshot(temp.path());
    let mut updater = updater_for(&server, temp.path());

    let outcome = updater.run(&mut true);

    assert!(
        outcome.to_string().starts_with("failed: ReleaseMetadataError"),
        "{}",
        outcome
    );
    assert!(matches!(
        outcome,
        UpdateOutcome::Failed {
            stage: Stage::FetchMetadata,
            ..
        }
    ));
    assert_eq!(updater.state(), UpdateState::Failed);
    download.assert_hits(0);
    assert_eq!(snapshot(temp.path()), before);
}

#[test]
fn backup_is_taken_before_download_and_saves_survive() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    let mut updater = updater_for(&server, temp.path());

    let outcome = updater.run(&mut true);

    let UpdateOutcome::Installed {
        previous, backup, ..
    } = &outcome
    else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(*previous, InstalledVersion::Known(Version::new(1, 0, 0)));

    let record = backup.as_ref().expect("backup record");
    assert!(record.archive.starts_with(temp.path().join("Backups")));
    assert!(fs::metadata(&record.archive).unwrap().len() > 0);
    assert_eq!(record.size, fs::metadata(&record.archive).unwrap().len());

    let history = updater.history();
    assert!(
        position(history, UpdateState::BackedUp { skipped: false })
            < position(history, UpdateState::Downloaded)
    );

    let live = temp.path().join("factorio");
    assert_eq!(
        fs::read(live.join("saves/world.zip")).unwrap(),
        b"precious save"
    );
    assert!(!live.join("old-release-only.txt").exists());
    assert!(live.join("data/base/info.json").is_file());
}

#[test]
fn truncated_artifact_leaves_installation_identical() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    let mut archive = release_archive("1.2.3");
    archive.truncate(archive.len() / 2);
    serve_artifact(&server, archive);
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    let live = temp.path().join("factorio");
    let before = snapshot(&live);
    let mut updater = updater_for(&server, temp.path());

    let outcome = updater.run(&mut false);

    let UpdateOutcome::Failed { stage, error } = &outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(*stage, Stage::Install);
    assert_eq!(error.kind(), "ExtractionError");
    assert_eq!(snapshot(&live), before);

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[test]
fn failed_backup_stops_before_download() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    // A file where the backup directory should go.
    fs::write(temp.path().join("Backups"), b"not a directory").unwrap();

    let outcome = updater_for(&server, temp.path()).run(&mut true);

    let UpdateOutcome::Failed { stage, error } = &outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(*stage, Stage::Backup);
    assert_eq!(error.kind(), "BackupError");
    download.assert_hits(0);
    assert_eq!(
        fs::read(temp.path().join("factorio/bin/x64/factorio")).unwrap(),
        server_script("1.0.0").as_bytes()
    );
}

#[test]
fn failing_probe_stops_before_metadata() {
    let server = MockServer::start();
    let metadata = serve_metadata(&server, "1.2.3");
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    let exe = temp.path().join("factorio/bin/x64/factorio");
    fs::write(&exe, "#!/bin/sh\necho 'broken install' >&2\nexit 3\n").unwrap();

    let outcome = updater_for(&server, temp.path()).run(&mut true);

    let UpdateOutcome::Failed { stage, error } = &outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(*stage, Stage::ProbeLocal);
    assert_eq!(error.kind(), "ProbeExecutionError");
    assert!(error.to_string().contains("broken install"));
    metadata.assert_hits(0);
}

#[test]
fn check_reports_plan_without_changes() {
    let server = MockServer::start();
    serve_metadata(&server, "1.2.3");
    let download = serve_artifact(&server, release_archive("1.2.3"));
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), "1.0.0");
    let before = snapshot(temp.path());
    let mut updater = updater_for(&server, temp.path());

    let plan = updater.check().unwrap();

    assert!(plan.update_needed());
    assert_eq!(plan.latest.version, Version::new(1, 2, 3));
    assert_eq!(updater.last_plan(), Some(&plan));
    download.assert_hits(0);
    assert_eq!(snapshot(temp.path()), before);
}
