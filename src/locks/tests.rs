//! Tests for the lock store.

use super::record::DIBS_FILE_NAME;
use super::store::AbsentReason;
use super::*;
use crate::channel::ChannelOutput;
use crate::error::DibsError;
use crate::test_support::{FakeRemote, MissingFilePolicy, endpoint, record_aged};

#[test]
fn record_url_is_cache_busted_public_path() {
    let url = endpoint().record_url("dev", 42);
    assert_eq!(
        url,
        "http://dev-acme.example.test/sites/default/files/__dibs.json?cb=42"
    );
}

#[test]
fn wordpress_sites_read_from_uploads() {
    let site = crate::catalog::SiteInfo {
        name: "blog".to_string(),
        framework: crate::catalog::Framework::WordPress,
    };
    let url = PublicEndpoint::new(&site, "pantheonsite.io").record_url("test", 7);
    assert_eq!(
        url,
        "http://test-blog.pantheonsite.io/wp-content/uploads/__dibs.json?cb=7"
    );
}

#[test]
fn reads_use_a_fresh_cache_buster() {
    let remote = FakeRemote::new();
    let store = LockStore::new(&remote, &remote, endpoint());

    for _ in 0..5 {
        store.read("dev");
    }
    let urls = remote.fetched_urls.borrow();
    assert!(urls.iter().all(|u| u.contains("?cb=")));
    let distinct: std::collections::HashSet<_> = urls.iter().collect();
    assert!(distinct.len() > 1, "cache buster should vary between reads");
}

#[test]
fn write_then_read_returns_record() {
    let remote = FakeRemote::new();
    let store = LockStore::new(&remote, &remote, endpoint());

    let record = LockRecord::new("alice", "dev", Some("regression run"));
    store.write("dev", &record).unwrap();

    assert_eq!(store.read("dev"), LockRead::Present(record));
}

#[test]
fn missing_record_reads_absent() {
    let remote = FakeRemote::new();
    let store = LockStore::new(&remote, &remote, endpoint());

    let read = store.read("dev");
    assert!(!read.is_locked());
    assert!(matches!(read, LockRead::Absent(AbsentReason::Unreachable(_))));
}

#[test]
fn unreachable_environment_reads_absent_even_with_record() {
    let remote = FakeRemote::new();
    remote.put_record("dev", &record_aged("bob", "dev", "mine", 60));
    remote.break_pull("dev");
    let store = LockStore::new(&remote, &remote, endpoint());

    // Fail-open: an unreadable record is indistinguishable from no record.
    assert!(!store.read("dev").is_locked());
}

#[test]
fn malformed_and_empty_bodies_read_absent() {
    let remote = FakeRemote::new();
    let store = LockStore::new(&remote, &remote, endpoint());

    remote.put_raw("dev", "<html>Not Found</html>");
    assert!(matches!(store.read("dev"), LockRead::Absent(AbsentReason::Malformed(_))));

    remote.put_raw("dev", "   ");
    assert!(matches!(store.read("dev"), LockRead::Absent(AbsentReason::Unreachable(_))));

    remote.put_raw("dev", r#"{"by":"bob","for":"dev"}"#);
    assert!(matches!(store.read("dev"), LockRead::Absent(AbsentReason::Malformed(_))));
}

#[test]
fn record_copied_from_another_environment_reads_absent() {
    let remote = FakeRemote::new();
    // `test` was cloned from `dev` and carries dev's record.
    remote.put_record("test", &record_aged("bob", "dev", "copied along", 60));
    let store = LockStore::new(&remote, &remote, endpoint());

    assert_eq!(
        store.read("test"),
        LockRead::Absent(AbsentReason::ForeignTarget("dev".to_string()))
    );
}

#[test]
fn write_uploads_from_staging_dir_and_cleans_it_up() {
    let remote = FakeRemote::new();
    let store = LockStore::new(&remote, &remote, endpoint());

    store
        .write("dev", &LockRecord::new("alice", "dev", None))
        .unwrap();

    let paths = remote.staging_paths.borrow();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with(DIBS_FILE_NAME));
    assert!(!paths[0].exists());
    assert!(!paths[0].parent().unwrap().exists());
}

#[test]
fn failed_upload_is_transport_error_and_still_cleans_up() {
    let remote = FakeRemote::new();
    remote.break_push("dev");
    let store = LockStore::new(&remote, &remote, endpoint());

    let err = store
        .write("dev", &LockRecord::new("alice", "dev", None))
        .unwrap_err();
    match &err {
        DibsError::TransportError {
            env,
            last_output,
            ..
        } => {
            assert_eq!(env, "dev");
            assert_eq!(last_output, "Permission denied (publickey).");
        }
        other => panic!("expected TransportError, got {:?}", other),
    }
    assert!(err.to_string().contains("calling dibs on dev"));

    let paths = remote.staging_paths.borrow();
    assert!(!paths[0].parent().unwrap().exists());
    assert_eq!(remote.raw("dev"), None);
}

#[test]
fn delete_removes_record() {
    let remote = FakeRemote::new();
    remote.put_record("dev", &record_aged("bob", "dev", "x", 10));
    let store = LockStore::new(&remote, &remote, endpoint());

    store.delete("dev").unwrap();
    assert!(!store.read("dev").is_locked());
}

#[test]
fn delete_of_missing_record_follows_channel_policy() {
    let strict = FakeRemote::with_policy(MissingFilePolicy::Fail);
    let store = LockStore::new(&strict, &strict, endpoint());
    let err = store.delete("dev").unwrap_err();
    assert!(matches!(err, DibsError::TransportError { .. }));
    assert!(err.to_string().contains("No such file"));

    let lenient = FakeRemote::with_policy(MissingFilePolicy::Succeed);
    let store = LockStore::new(&lenient, &lenient, endpoint());
    assert!(store.delete("dev").is_ok());
}

#[test]
fn failed_delete_carries_last_output() {
    let remote = FakeRemote::new();
    remote.put_record("dev", &record_aged("bob", "dev", "x", 10));
    remote.break_push("dev");
    let store = LockStore::new(&remote, &remote, endpoint());

    let err = store.delete("dev").unwrap_err();
    assert_eq!(
        err.to_string(),
        "there was a problem releasing dibs on dev. Last message: Permission denied (publickey)."
    );
    assert!(remote.raw("dev").is_some());
}

#[test]
fn timed_out_push_is_transport_error() {
    struct SlowPush;
    impl crate::channel::PushChannel for SlowPush {
        fn upload(
            &self,
            _: &str,
            _: &std::path::Path,
            _: &str,
        ) -> crate::error::Result<ChannelOutput> {
            Ok(ChannelOutput::timeout("sftp> put"))
        }
        fn remove(&self, _: &str, _: &str) -> crate::error::Result<ChannelOutput> {
            Ok(ChannelOutput::timeout(""))
        }
        fn run_query(&self, _: &str, _: &str) -> crate::error::Result<ChannelOutput> {
            Ok(ChannelOutput::timeout(""))
        }
    }

    let remote = FakeRemote::new();
    let store = LockStore::new(&SlowPush, &remote, endpoint());

    let err = store
        .write("dev", &LockRecord::new("alice", "dev", None))
        .unwrap_err();
    assert!(err.to_string().contains("timed out"));
    let err = store.delete("dev").unwrap_err();
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn connection_lookup_failure_is_transport_error() {
    struct NoConnection;
    impl crate::channel::PushChannel for NoConnection {
        fn upload(
            &self,
            _: &str,
            _: &std::path::Path,
            _: &str,
        ) -> crate::error::Result<ChannelOutput> {
            Err(DibsError::CatalogError("environment not found".to_string()))
        }
        fn remove(&self, _: &str, _: &str) -> crate::error::Result<ChannelOutput> {
            Err(DibsError::CatalogError("environment not found".to_string()))
        }
        fn run_query(&self, _: &str, _: &str) -> crate::error::Result<ChannelOutput> {
            Err(DibsError::CatalogError("environment not found".to_string()))
        }
    }

    let remote = FakeRemote::new();
    let store = LockStore::new(&NoConnection, &remote, endpoint());

    let err = store
        .write("dev", &LockRecord::new("alice", "dev", None))
        .unwrap_err();
    assert!(matches!(
        err,
        DibsError::TransportError { ref operation, .. } if operation == "calling dibs on"
    ));
    assert!(err.to_string().contains("environment not found"));

    let err = store.delete("dev").unwrap_err();
    assert!(matches!(
        err,
        DibsError::TransportError { ref operation, .. } if operation == "releasing dibs on"
    ));
}
