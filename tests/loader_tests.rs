use std::io::Write;
use tempfile::NamedTempFile;
use tracewise::error::TraceError;
use tracewise::letters::loader::{load_letters, load_letters_from_file};
use tracewise::letters::ReferenceStore;

// --- CSV LOAD TESTS ---

#[test]
fn test_loader_parses_letters_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "letter,path,x,y").unwrap();
    writeln!(file, "L,0,100,50").unwrap();
    writeln!(file, "L,0,100,250").unwrap();
    writeln!(file, "L,1,100,250").unwrap();
    writeln!(file, "L,1,200,250").unwrap();
    writeln!(file, " t , 0 , 150 , 60 ").unwrap();
    writeln!(file, "t,0,150,240").unwrap();

    let store = load_letters_from_file(file.path()).unwrap();
    assert_eq!(store.len(), 2);

    let l = store.get("l").expect("lookup is case-insensitive");
    assert_eq!(l.path_count(), 2);
    assert_eq!(l.paths[1].points()[1].x, 200.0);
    assert!((l.paths[0].length() - 200.0).abs() < 1e-4);

    let t = store.require("T").unwrap();
    assert_eq!(t.paths[0].segment_count(), 1);
}

#[test]
fn test_loader_groups_interleaved_rows() {
    let csv = "letter,path,x,y\nV,1,150,250\nV,0,100,50\nV,1,200,50\nV,0,150,250\n";
    let store = load_letters(csv.as_bytes()).unwrap();
    let v = store.get("V").unwrap();
    assert_eq!(v.path_count(), 2);
    // File order is kept within a path
    assert_eq!((v.paths[0].points()[0].x, v.paths[0].points()[0].y), (100.0, 50.0));
    assert_eq!((v.paths[1].points()[0].x, v.paths[1].points()[0].y), (150.0, 250.0));
}

#[test]
fn test_loader_rejects_gaps_in_path_indices() {
    let csv = "letter,path,x,y\nI,0,150,50\nI,0,150,250\nI,2,100,50\nI,2,200,50\n";
    let err = load_letters(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, TraceError::Validation(ref m) if m.contains("contiguous")));
}

#[test]
fn test_loader_rejects_single_point_paths() {
    let csv = "letter,path,x,y\nO,0,150,50\n";
    let err = load_letters(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, TraceError::Validation(_)));
}

#[test]
fn test_loader_reports_bad_numbers_with_row() {
    let csv = "letter,path,x,y\nA,0,100,200\nA,0,abc,50\n";
    let err = load_letters(csv.as_bytes()).unwrap_err();
    match err {
        TraceError::Validation(m) => {
            assert!(m.contains("row 2"), "{}", m);
            assert!(m.contains("abc"), "{}", m);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_letters_from_file("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}

#[test]
fn test_loaded_letters_override_builtins() {
    let csv = "letter,path,x,y\nA,0,10,10\nA,0,290,290\n";
    let custom = load_letters(csv.as_bytes()).unwrap();
    let store = ReferenceStore::builtin().merge(custom);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("A").unwrap().path_count(), 1);
    assert!(store.get("Q").is_none());
    assert!(matches!(store.require("Q"), Err(TraceError::UnknownLetter(_))));
}

#[test]
fn test_builtin_store_has_letter_a() {
    let store = ReferenceStore::builtin();
    let a = store.get("a").unwrap();
    assert_eq!(a.letter, "A");
    assert_eq!(a.path_count(), 3);
    assert!(a.paths.iter().all(|p| p.segment_count() == 2));
}
