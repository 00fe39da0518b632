//! Resolution pipeline tests


use fileserve_http::{Error, Handler, HttpFile, Registration, Response};
use fileserve_service::FileService;
use fileserve_vfs::{FileSystemVfs, MemoryVfs};
use fixtures::*;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LOCATION, VARY};
use http::{Method, StatusCode};
use rstest::*;
use tempfile::TempDir;

fn site_service(dir: &TempDir, auto_index: bool) -> FileService {
	FileService::builder(FileSystemVfs::new(dir.path()))
		.auto_index(auto_index)
		.build()
}

#[rstest]
#[tokio::test]
async fn test_serves_exact_file(site_dir: TempDir) {
	let service = site_service(&site_dir, false);

	let response = get(&service, "/foo.txt", None).await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
	assert_eq!(response.headers[CONTENT_LENGTH], "3");
	assert_eq!(body_text(response).await, "foo");
}

#[rstest]
#[tokio::test]
async fn test_missing_file_is_not_found(site_dir: TempDir) {
	let service = site_service(&site_dir, true);
	let response = get(&service, "/missing.txt", None).await;
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_head_has_no_body(site_dir: TempDir) {
	let service = site_service(&site_dir, false);
	let response = service
		.handle(request(Method::HEAD, "/foo.txt", None))
		.await
		.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.headers[CONTENT_LENGTH], "3");
	assert!(body_text(response).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_other_methods_are_not_allowed(site_dir: TempDir) {
	let service = site_service(&site_dir, false);
	let response = service
		.handle(request(Method::POST, "/foo.txt", None))
		.await
		.unwrap();
	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[rstest]
#[tokio::test]
async fn test_path_traversal_is_not_found(site_dir: TempDir) {
	let service = site_service(&site_dir, true);
	let response = get(&service, "/auto_index/%2E%2E/%2E%2E/etc/passwd", None).await;
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case(Some("gzip"), "gzip-marker", Some("gzip"))]
#[case(Some("br"), "br-marker", Some("br"))]
#[case(Some("gzip, deflate, br"), "br-marker", Some("br"))]
#[case(Some("identity"), "plain", None)]
#[case(None, "plain", None)]
#[tokio::test]
async fn test_encoding_priority(
	compressed_vfs: MemoryVfs,
	#[case] accept: Option<&'static str>,
	#[case] expected_body: &str,
	#[case] expected_encoding: Option<&str>,
) {
	let service = FileService::builder(compressed_vfs)
		.serve_compressed(true)
		.build();

	let response = get(&service, "/foo.txt", accept).await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response
			.headers
			.get(CONTENT_ENCODING)
			.map(|v| v.to_str().unwrap()),
		expected_encoding
	);
	assert_eq!(response.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
	if expected_encoding.is_some() {
		assert_eq!(response.headers[VARY], "accept-encoding");
	}
	assert_eq!(body_text(response).await, expected_body);
}

#[rstest]
#[tokio::test]
async fn test_negotiated_brotli_decodes_to_original() {
	let vfs = MemoryVfs::new();
	vfs.insert("/foo.txt", "foo");
	vfs.insert("/foo.txt.br", brotli(b"foo"));
	vfs.insert("/foo.txt.gz", gzip(b"foo"));
	let service = FileService::builder(vfs).serve_compressed(true).build();

	let response = get(&service, "/foo.txt", Some("gzip, br")).await;
	assert_eq!(response.headers[CONTENT_ENCODING], "br");
	let body = response.body.collect().await.unwrap();

	let mut decoded = Vec::new();
	std::io::Read::read_to_end(
		&mut brotli::Decompressor::new(body.as_ref(), 4096),
		&mut decoded,
	)
	.unwrap();
	assert_eq!(decoded, b"foo");
}

#[rstest]
#[tokio::test]
async fn test_compressed_variants_ignored_when_disabled(compressed_vfs: MemoryVfs) {
	let service = FileService::of(compressed_vfs);
	let response = get(&service, "/foo.txt", Some("br, gzip")).await;
	assert!(!response.headers.contains_key(CONTENT_ENCODING));
	assert_eq!(body_text(response).await, "plain");
}

#[rstest]
#[tokio::test]
async fn test_br_is_preferred_in_cache_keys(compressed_vfs: MemoryVfs) {
	let service = FileService::builder(compressed_vfs)
		.serve_compressed(true)
		.build();

	assert_eq!(body_text(get(&service, "/foo.txt", Some("gzip, br")).await).await, "br-marker");
	assert_eq!(body_text(get(&service, "/foo.txt", Some("gzip")).await).await, "gzip-marker");
	assert_eq!(body_text(get(&service, "/foo.txt", Some("gzip, br")).await).await, "br-marker");

	service.cache().run_pending_tasks().await;
	assert_eq!(service.statistics().entry_count, 2);
	assert_eq!(service.statistics().hits, 1);
}

#[rstest]
#[tokio::test]
async fn test_directory_serves_index(site_dir: TempDir) {
	let service = site_service(&site_dir, false);
	assert_eq!(get_text(&service, "/").await, "<h1>root</h1>");
}

#[rstest]
#[case("/auto_index", "/auto_index/")]
#[case("/auto_index?foobar=1", "/auto_index/?foobar=1")]
#[case("/auto_index/child_dir_with_custom_index", "/auto_index/child_dir_with_custom_index/")]
#[tokio::test]
async fn test_directory_redirect_preserves_query(
	site_dir: TempDir,
	#[case] uri: &str,
	#[case] location: &str,
) {
	let service = site_service(&site_dir, true);
	let response = get(&service, uri, None).await;
	assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
	assert_eq!(response.headers[LOCATION], location);
}

#[rstest]
#[tokio::test]
async fn test_no_redirect_without_index_or_listing(site_dir: TempDir) {
	let service = site_service(&site_dir, false);

	let response = get(&service, "/auto_index", None).await;
	assert_eq!(response.status, StatusCode::NOT_FOUND);

	let response = get(&service, "/auto_index/", None).await;
	assert_eq!(response.status, StatusCode::NOT_FOUND);

	// An index document still triggers the redirect.
	let response = get(&service, "/auto_index/child_dir_with_custom_index", None).await;
	assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
}

#[rstest]
#[case("/auto_index/")]
#[case("/auto_index/?foobar=1")]
#[tokio::test]
async fn test_directory_listing(site_dir: TempDir, #[case] uri: &str) {
	let service = site_service(&site_dir, true);

	let response = get(&service, uri, None).await;
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.headers[CONTENT_TYPE], "text/html; charset=utf-8");
	let html = body_text(response).await;
	for expected in [
		"Directory listing: /auto_index/",
		"4 file(s) total",
		r#"<a href="../">../</a>"#,
		r#"<a href="child_dir/">child_dir/</a>"#,
		r#"<a href="child_file">child_file</a>"#,
		r#"<a href="child_dir_with_custom_index/">child_dir_with_custom_index/</a>"#,
		r#"<a href="empty_child_dir/">empty_child_dir/</a>"#,
	] {
		assert!(html.contains(expected), "missing {expected:?} in {html}");
	}
}

#[rstest]
#[case("/auto_index/empty_child_dir/")]
#[case("/auto_index/empty_child_dir/?foo=1")]
#[tokio::test]
async fn test_empty_directory_listing(site_dir: TempDir, #[case] uri: &str) {
	let service = site_service(&site_dir, true);
	let html = body_text(get(&service, uri, None).await).await;
	assert!(html.contains("Directory listing: /auto_index/empty_child_dir/"));
	assert!(html.contains("0 file(s) total"));
	assert!(html.contains(r#"<a href="../">../</a>"#));
}

#[rstest]
#[tokio::test]
async fn test_custom_index_takes_precedence(site_dir: TempDir) {
	let service = site_service(&site_dir, true);
	assert_eq!(
		get_text(&service, "/auto_index/child_dir_with_custom_index/?foo=1").await,
		"custom_index_file"
	);
}

#[rstest]
#[tokio::test]
async fn test_listing_is_never_cached(site_dir: TempDir) {
	let service = site_service(&site_dir, true);
	get(&service, "/auto_index/", None).await;
	std::fs::write(site_dir.path().join("auto_index/new_file"), "new").unwrap();

	let html = body_text(get(&service, "/auto_index/", None).await).await;
	assert!(html.contains("5 file(s) total"));
	assert!(html.contains(r#"<a href="new_file">new_file</a>"#));
}

#[rstest]
#[tokio::test]
async fn test_auto_decompress_serves_decoded_content() {
	let vfs = MemoryVfs::new();
	vfs.insert("/only-gzip.txt.gz", gzip(b"decoded from gzip"));
	vfs.insert("/only-br.txt.br", brotli(b"decoded from brotli"));
	let service = FileService::builder(vfs)
		.serve_compressed(true)
		.auto_decompress(true)
		.build();

	let response = get(&service, "/only-gzip.txt", None).await;
	assert_eq!(response.status, StatusCode::OK);
	assert!(!response.headers.contains_key(CONTENT_ENCODING));
	assert_eq!(response.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
	assert_eq!(body_text(response).await, "decoded from gzip");

	assert_eq!(get_text(&service, "/only-br.txt").await, "decoded from brotli");

	// A client accepting the encoding gets the stored bytes.
	let response = get(&service, "/only-gzip.txt", Some("gzip")).await;
	assert_eq!(response.headers[CONTENT_ENCODING], "gzip");
	assert_eq!(
		response.body.collect().await.unwrap().as_ref(),
		gzip(b"decoded from gzip").as_slice()
	);
}

#[rstest]
#[tokio::test]
async fn test_auto_decompress_prefers_uncompressed_original() {
	let vfs = MemoryVfs::new();
	vfs.insert("/foo.txt", "original");
	vfs.insert("/foo.txt.gz", gzip(b"decoded"));
	let service = FileService::builder(vfs)
		.serve_compressed(true)
		.auto_decompress(true)
		.build();

	assert_eq!(get_text(&service, "/foo.txt").await, "original");
}

#[rstest]
#[tokio::test]
async fn test_find_file_outcomes(site_dir: TempDir) {
	let service = site_service(&site_dir, true);

	let file = service
		.find_file(&request(Method::GET, "/foo.txt", None))
		.await
		.unwrap();
	assert_eq!(file.attributes().unwrap().length(), 3);

	let file = service
		.find_file(&request(Method::GET, "/auto_index", None))
		.await
		.unwrap();
	assert!(matches!(file, HttpFile::Redirect(ref location) if location == "/auto_index/"));

	let file = service
		.find_file(&request(Method::GET, "/nope", None))
		.await
		.unwrap();
	assert!(file.is_non_existent());
}

#[rstest]
#[tokio::test]
async fn test_or_else_falls_through(site_dir: TempDir) {
	let fallback = MemoryVfs::new();
	fallback.insert("/fallback.txt", "from fallback");
	fallback.insert("/foo.txt", "shadowed");
	fallback.insert("/auto_index", "not a directory here");
	let service = site_service(&site_dir, true).or_else(FileService::of(fallback));

	assert_eq!(get_text(&service, "/foo.txt").await, "foo");
	assert_eq!(get_text(&service, "/fallback.txt").await, "from fallback");
	// Redirects of the primary fall through as well.
	assert_eq!(get_text(&service, "/auto_index").await, "not a directory here");

	let response: Response = get(&service, "/neither.txt", None).await;
	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_or_else_delegates_hooks(site_dir: TempDir) {
	let cached = site_service(&site_dir, false).or_else(FileService::of(MemoryVfs::new()));
	assert!(cached.should_cache_path("/foo.txt", None));
	assert!(cached.on_registered(&Registration::new("/static/")).is_ok());

	let uncached = site_service(&site_dir, false).or_else(
		FileService::builder(MemoryVfs::new())
			.max_cache_entries(0)
			.build(),
	);
	assert!(!uncached.should_cache_path("/foo.txt", None));
}

#[rstest]
#[case(Failure::Attributes, "/a.txt")]
#[case(Failure::Attributes, "/docs/")]
#[case(Failure::List, "/docs/")]
#[tokio::test]
async fn test_storage_errors_reach_the_caller(#[case] failure: Failure, #[case] path: &str) {
	let service = FileService::builder(FailingVfs(failure))
		.auto_index(true)
		.build();

	let result = service.find_file(&request(Method::GET, path, None)).await;
	assert!(matches!(result, Err(Error::Io(_))));

	let result = service.handle(request(Method::GET, path, None)).await;
	assert!(matches!(result, Err(Error::Io(_))));
}
