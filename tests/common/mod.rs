//! Common test utilities

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::{Arc, Mutex};

use v2ex_explore::config::Config;
use v2ex_explore::crawler::V2exClient;
use v2ex_explore::notifications::{Notice, Notifier};
use v2ex_explore::session::Session;

#[allow(dead_code)]
/// Read an HTML fixture from `tests/fixtures/html`
pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/html")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}

/// Config pointing every site request at a mock server
///
/// The search API is addressed as `localhost` so it counts as a different
/// host from the `127.0.0.1` site origin.
#[allow(dead_code)]
pub fn mock_config(uri: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = uri.to_string();
    config.site.search_url = format!("{}/api/search", uri.replace("127.0.0.1", "localhost"));
    config
}

/// Client bound to a mock server with a fresh in-memory session
#[allow(dead_code)]
pub fn mock_client(uri: &str) -> V2exClient {
    V2exClient::new(&mock_config(uri), Arc::new(Session::in_memory())).unwrap()
}

/// Client bound to a mock server with a signed-in in-memory session
#[allow(dead_code)]
pub fn signed_in_client(uri: &str, credential: &str) -> V2exClient {
    let session = Session::in_memory();
    session.set_credential(credential).unwrap();
    V2exClient::new(&mock_config(uri), Arc::new(session)).unwrap()
}

#[allow(dead_code)]
/// Notifier that keeps every notice for inspection
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// Minimal topic page whose second box holds replies for `floors`
///
/// With `pages > 1` a pager is added, so the page also works as page 1 of a
/// multi-page topic.
#[allow(dead_code)]
pub fn reply_page(floors: RangeInclusive<u32>, declared: u32, pages: u32) -> String {
    let cells: String = floors
        .map(|floor| {
            format!(
                r#"<div id="r_{id}" class="cell">
                     <img src="/avatar/{floor}.png" class="avatar" />
                     <div class="fr"><span class="no">{floor}</span></div>
                     <strong><a href="/member/u{floor}" class="dark">u{floor}</a></strong>
                     <span class="ago">{floor} 分钟前</span>
                     <div class="reply_content">reply {floor}</div>
                   </div>"#,
                id = 70_000 + floor,
            )
        })
        .collect();

    let pager: String = if pages > 1 {
        let links: String = (2..=pages)
            .map(|p| format!(r#"<a href="?p={p}" class="page_normal">{p}</a>"#))
            .collect();
        format!(r#"<div class="cell"><a href="?p=1" class="page_current">1</a>{links}</div>"#)
    } else {
        String::new()
    };

    format!(
        r#"<html><head><title>Topic - V2EX</title></head><body>
           <div id="Main">
             <div class="box"><div class="header"><h1>Topic</h1></div></div>
             <div class="box">
               <div class="cell"><span class="gray">{declared} 条回复 • 2024-05-01</span></div>
               {pager}
               {cells}
             </div>
           </div></body></html>"#
    )
}
