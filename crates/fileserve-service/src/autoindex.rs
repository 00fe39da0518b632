//! Directory listing pages

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt::Write;

/// Characters escaped in listing links. `/` is kept so that directory
/// links retain their trailing slash.
const HREF: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'&')
	.add(b'\'')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}');

/// Renders the HTML listing of the directory `dir_path`.
///
/// `dir_path` is the decoded request path of the directory; `children` are
/// the entry names as returned by the byte source, directories carrying a
/// trailing `/`. Links are relative to the directory.
///
/// # Examples
///
/// ```
/// use fileserve_service::autoindex::render;
///
/// let html = render("/docs/", &["a b.txt".to_string(), "img/".to_string()]);
/// assert!(html.contains("Directory listing: /docs/"));
/// assert!(html.contains("2 file(s) total"));
/// assert!(html.contains(r#"<a href="../">../</a>"#));
/// assert!(html.contains(r#"<a href="a%20b.txt">a b.txt</a>"#));
/// assert!(html.contains(r#"<a href="img/">img/</a>"#));
/// ```
pub fn render(dir_path: &str, children: &[String]) -> String {
	let title = escape_html(dir_path);
	let mut html = String::with_capacity(512 + children.len() * 64);
	html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
	let _ = writeln!(html, "<title>Directory listing: {title}</title>");
	html.push_str(
		"<style>\nbody { font-family: sans-serif; }\nul { list-style: none; padding-left: 1em; }\n</style>\n",
	);
	html.push_str("</head>\n<body>\n");
	let _ = writeln!(html, "<h1>Directory listing: {title}</h1>");
	let _ = writeln!(html, "<p>{} file(s) total</p>", children.len());
	html.push_str("<ul>\n<li><a href=\"../\">../</a></li>\n");
	for child in children {
		let href = utf8_percent_encode(child, HREF);
		let _ = writeln!(
			html,
			"<li><a href=\"{href}\">{}</a></li>",
			escape_html(child)
		);
	}
	html.push_str("</ul>\n</body>\n</html>\n");
	html
}

fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			c => escaped.push(c),
		}
	}
	escaped
}
