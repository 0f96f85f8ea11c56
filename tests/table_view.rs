use hexar_lib::{
    errors::TableError,
    table::{BoundedTableView, ViewEvent},
    Database, NewLogRow,
};

async fn database_with_rows(rows: usize) -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = Database::new(dir.path().join("HEXAR_data.db")).expect("open db");
    db.create_run_table("H1").await.expect("create run");
    let readings = (0..rows)
        .map(|i| {
            NewLogRow::reading(
                format!("{:02}:{:02}:{:02}", 8 + i / 240, (i / 4) % 60, (i % 4) * 15),
                240.0 + (i % 10) as f64,
                120.5,
            )
        })
        .collect();
    db.insert_log_rows("H1", readings).await.expect("seed rows");
    (dir, db)
}

#[tokio::test]
async fn reload_of_a_large_table_keeps_rows_51_to_250() {
    let (_dir, db) = database_with_rows(250).await;
    let view = BoundedTableView::open(db.clone(), "H1", 200).await.unwrap();

    assert_eq!(view.row_count(), 200);
    assert_eq!(view.column_count(), 4);

    let all = db.fetch_all_rows("H1").await.unwrap();
    assert_eq!(view.rows(), &all[50..]);
    assert_eq!(view.rows().first().unwrap().row_id, 51);
    assert_eq!(view.rows().last().unwrap().row_id, 250);
    assert!(view.rows().windows(2).all(|w| w[0].row_id < w[1].row_id));
}

#[tokio::test]
async fn view_follows_appends_after_reload() {
    let (_dir, db) = database_with_rows(5).await;
    let mut view = BoundedTableView::open(db.clone(), "H1", 5).await.unwrap();
    let mut events = view.subscribe();

    db.insert_log_row("H1", &NewLogRow::reading("09:00:00", 251.3, 27.8))
        .await
        .unwrap();
    assert_eq!(view.row_count(), 5);
    assert_eq!(view.rows().last().unwrap().row_id, 5);

    view.reload().await.unwrap();
    assert_eq!(events.recv().await.unwrap(), ViewEvent::Reset { rows: 5 });
    assert_eq!(view.rows().first().unwrap().row_id, 2);
    assert_eq!(view.value_at(4, 0).unwrap(), "09:00:00");
    assert_eq!(view.value_at(4, 1).unwrap(), "251.3");
}

#[tokio::test]
async fn comment_edit_survives_cache_shift() {
    let (_dir, db) = database_with_rows(3).await;
    let mut view = BoundedTableView::open(db.clone(), "H1", 3).await.unwrap();

    // Row 0 currently shows row id 1; edit it, then shift the window.
    view.set_comment(0, "\tfirst reading\n").await.unwrap();
    db.insert_log_row("H1", &NewLogRow::reading("09:00:00", 240.0, 120.0))
        .await
        .unwrap();
    view.reload().await.unwrap();

    let stored = db.fetch_all_rows("H1").await.unwrap();
    assert_eq!(stored[0].comment, "first reading");
    assert!(view.rows().iter().all(|r| r.comment.is_empty()));

    view.set_comment(0, "second").await.unwrap();
    let stored = db.fetch_all_rows("H1").await.unwrap();
    assert_eq!(stored[1].comment, "second");
    assert_eq!(stored[0].comment, "first reading");
}

#[tokio::test]
async fn edits_to_read_only_columns_change_nothing() {
    let (_dir, db) = database_with_rows(4).await;
    let mut view = BoundedTableView::open(db.clone(), "H1", 200).await.unwrap();
    let cache = view.rows().to_vec();
    let storage = db.fetch_all_rows("H1").await.unwrap();

    assert!(!view.set_value(0, 0, "12:00:00").await.unwrap());
    assert!(!view.set_value(0, 1, "1.0").await.unwrap());
    assert!(!view.set_value(0, 2, "1.0").await.unwrap());

    assert_eq!(view.rows(), cache.as_slice());
    assert_eq!(db.fetch_all_rows("H1").await.unwrap(), storage);
}

#[tokio::test]
async fn out_of_range_cells_are_reported() {
    let (_dir, db) = database_with_rows(1).await;
    let view = BoundedTableView::open(db, "H1", 200).await.unwrap();

    match view.value_at(1, 0) {
        Err(TableError::OutOfRange { row, rows, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(rows, 1);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}
