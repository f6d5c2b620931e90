mod common;

use common::{write_jpeg, Harness, WriteMode};
use image_service::AppError;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn second_request_does_not_regenerate() {
    let h = Harness::new();
    write_jpeg(h.source_dir.path(), "photo.jpg", 640, 480);

    let first = assert_ok!(h.resolver.resolve_thumbnail("photo.jpg", "64,64").await);
    let second = assert_ok!(h.resolver.resolve_thumbnail("photo.jpg", "64,64").await);

    assert_eq!(first.content, second.content);
    assert_eq!(first.etag(), second.etag());
    assert_eq!(h.thumbs.write_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_requests_share_one_artifact() {
    let h = Harness::new();
    write_jpeg(h.source_dir.path(), "photo.jpg", 640, 480);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let resolver = h.resolver.clone();
            tokio::spawn(async move { resolver.resolve_thumbnail("photo.jpg", "120,90").await })
        })
        .collect();

    let mut bodies = Vec::new();
    for task in tasks {
        let file = assert_ok!(task.await.unwrap());
        assert_eq!(file.path, "photo_120_90.jpg");
        bodies.push(file.content);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(h.thumbs.write_count() >= 1);
    assert!(h.sink.messages().is_empty());

    let artifacts: Vec<_> = std::fs::read_dir(h.thumbs_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(artifacts, vec![std::ffi::OsString::from("photo_120_90.jpg")]);
}

#[tokio::test]
async fn losing_the_write_race_serves_the_stored_copy() {
    let h = Harness::with_write_mode(WriteMode::LoseRace);
    write_jpeg(h.source_dir.path(), "photo.jpg", 640, 480);

    let file = assert_ok!(h.resolver.resolve_thumbnail("photo.jpg", "120,90").await);

    let stored = std::fs::read(h.thumbs_dir.path().join("photo_120_90.jpg")).unwrap();
    assert_eq!(file.content.to_vec(), stored);
    assert!(h.sink.messages().is_empty());
}

#[tokio::test]
async fn every_size_form_gets_a_distinct_artifact() {
    let h = Harness::new();
    write_jpeg(h.source_dir.path(), "photo.jpg", 640, 480);

    for size in ["160,120", "160", ",120", "abc"] {
        assert_ok!(h.resolver.resolve_thumbnail("photo.jpg", size).await);
    }

    let mut names: Vec<String> = std::fs::read_dir(h.thumbs_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "photo.jpg".to_string(),
            "photo_160.jpg".to_string(),
            "photo_160_120.jpg".to_string(),
            "photo__120.jpg".to_string(),
        ]
    );
}

#[tokio::test]
async fn unset_size_reencodes_at_source_dimensions() {
    let h = Harness::new();
    write_jpeg(h.source_dir.path(), "photo.jpg", 90, 70);

    let file = assert_ok!(h.resolver.resolve_thumbnail("photo.jpg", "x,y").await);

    assert_eq!(file.path, "photo.jpg");
    let decoded = image::load_from_memory(&file.content).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (90, 70));
    assert!(h.thumbs_dir.path().join("photo.jpg").is_file());
}

#[tokio::test]
async fn write_failure_is_reported_and_recorded() {
    let h = Harness::with_write_mode(WriteMode::Fail);
    write_jpeg(h.source_dir.path(), "photo.jpg", 640, 480);

    let err = assert_err!(h.resolver.resolve_thumbnail("photo.jpg", "100,100").await);

    assert!(matches!(err, AppError::WriteFailure { .. }));
    assert!(err.to_string().starts_with("Error creating file: photo_100_100.jpg"));
    assert_eq!(
        h.sink.messages(),
        vec!["Error creating file: photo_100_100.jpg".to_string()]
    );
    assert!(!h.thumbs_dir.path().join("photo_100_100.jpg").exists());
}

#[tokio::test]
async fn corrupt_source_fails_generation() {
    let h = Harness::new();
    // JPEG magic followed by garbage: sniffs as JPEG, fails to decode
    let mut bogus = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bogus.extend_from_slice(&[0u8; 64]);
    std::fs::write(h.source_dir.path().join("broken.jpg"), bogus).unwrap();

    let err = assert_err!(h.resolver.resolve_thumbnail("broken.jpg", "10,10").await);

    assert!(matches!(err, AppError::Generation { .. }));
    assert_eq!(h.thumbs.write_count(), 0);
    assert_eq!(h.sink.messages().len(), 1);
}
