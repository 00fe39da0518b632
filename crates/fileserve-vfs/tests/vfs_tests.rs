//! Both byte sources answer the same questions the same way

use fileserve_vfs::{BufferPool, FileSystemVfs, HttpVfs, MemoryVfs};
use futures::TryStreamExt;
use rstest::*;
use std::io;
use tempfile::TempDir;

const FILES: &[(&str, &str)] = &[
	("/index.html", "<h1>root</h1>"),
	("/css/app.css", "body {}"),
	("/css/vendor/reset.css", "* {}"),
	("/notes.txt", "notes"),
];

enum Source {
	Memory,
	FileSystem,
}

/// Keeps the temporary directory of a file system source alive.
struct Tree {
	vfs: Box<dyn HttpVfs>,
	_dir: Option<TempDir>,
}

fn tree(source: Source) -> Tree {
	match source {
		Source::Memory => {
			let vfs = MemoryVfs::new();
			for (path, content) in FILES {
				vfs.insert(path, *content);
			}
			Tree {
				vfs: Box::new(vfs),
				_dir: None,
			}
		}
		Source::FileSystem => {
			let dir = TempDir::new().unwrap();
			for (path, content) in FILES {
				let file = dir.path().join(path.trim_start_matches('/'));
				std::fs::create_dir_all(file.parent().unwrap()).unwrap();
				std::fs::write(file, content).unwrap();
			}
			Tree {
				vfs: Box::new(FileSystemVfs::new(dir.path())),
				_dir: Some(dir),
			}
		}
	}
}

#[rstest]
#[case::memory(Source::Memory)]
#[case::file_system(Source::FileSystem)]
#[tokio::test]
async fn test_attributes(#[case] source: Source) {
	let tree = tree(source);
	let vfs = tree.vfs.as_ref();

	let attrs = vfs.attributes("/css/app.css").await.unwrap().unwrap();
	assert_eq!(attrs.length(), 7);
	assert!(vfs.attributes("/css").await.unwrap().is_none());
	assert!(vfs.attributes("/css/").await.unwrap().is_none());
	assert!(vfs.attributes("/missing.txt").await.unwrap().is_none());
	assert!(vfs.attributes("/notes.txt/child").await.unwrap().is_none());
}

#[rstest]
#[case::memory(Source::Memory)]
#[case::file_system(Source::FileSystem)]
#[tokio::test]
async fn test_read_and_stream(#[case] source: Source) {
	let tree = tree(source);
	let vfs = tree.vfs.as_ref();
	let pool = BufferPool::new();

	let buffer = vfs.read("/notes.txt", &pool).await.unwrap();
	assert_eq!(buffer.bytes().as_ref(), b"notes");
	assert_eq!(pool.stats().outstanding, 1);
	buffer.release();
	assert_eq!(pool.stats().outstanding, 0);

	let chunks: Vec<_> = vfs
		.stream("/index.html")
		.await
		.unwrap()
		.try_collect()
		.await
		.unwrap();
	assert_eq!(chunks.concat(), b"<h1>root</h1>");

	let err = vfs.read("/missing.txt", &pool).await.unwrap_err();
	assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[rstest]
#[case::memory(Source::Memory)]
#[case::file_system(Source::FileSystem)]
#[tokio::test]
async fn test_listing(#[case] source: Source) {
	let tree = tree(source);
	let vfs = tree.vfs.as_ref();

	assert!(vfs.can_list("/").await.unwrap());
	assert!(vfs.can_list("/css/").await.unwrap());
	assert!(!vfs.can_list("/notes.txt").await.unwrap());
	assert!(!vfs.can_list("/nowhere/").await.unwrap());

	assert_eq!(
		vfs.list("/").await.unwrap(),
		vec!["css/", "index.html", "notes.txt"]
	);
	assert_eq!(vfs.list("/css/").await.unwrap(), vec!["app.css", "vendor/"]);
}
