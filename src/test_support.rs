//! Fixtures shared by unit tests

use rand::Rng;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a ZIP archive with the given `(entry name, contents)` pairs
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
}

/// Minimal valid manifest JSON for a named pack
pub fn manifest_json(name: &str, version: &str, files: &[(u64, u64)]) -> Vec<u8> {
    let files: Vec<_> = files
        .iter()
        .map(|(project, file)| serde_json::json!({ "projectID": project, "fileID": file }))
        .collect();

    serde_json::json!({
        "manifestType": "minecraftModpack",
        "manifestVersion": 1,
        "name": name,
        "version": version,
        "author": "Tester",
        "minecraft": { "version": "1.12.2", "modLoaders": [{ "id": "forge-14.23.5.2847", "primary": true }] },
        "overrides": "overrides",
        "files": files
    })
    .to_string()
    .into_bytes()
}

/// Plays the content host: project redirect, canonical page, download
/// redirect and the file itself, with random latency on every hop.
pub struct FakeHost {
    failing_project: Option<u64>,
}

impl Respond for FakeHost {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let delay = Duration::from_millis(rand::thread_rng().gen_range(0..25));
        let segments: Vec<&str> = request.url.path().trim_matches('/').split('/').collect();

        let response = match segments.as_slice() {
            ["mc-mods", project] => ResponseTemplate::new(301)
                .insert_header("Location", format!("/projects/mod-{}", project).as_str()),
            ["projects", _slug] => ResponseTemplate::new(200),
            ["projects", slug, "files", file, "download"] => ResponseTemplate::new(302)
                .insert_header("Location", format!("/cdn/{}/{}-{}.jar", file, slug, file).as_str()),
            ["cdn", _file, name] => {
                let failing = self
                    .failing_project
                    .map(|p| name.starts_with(&format!("mod-{}-", p)))
                    .unwrap_or(false);
                if failing {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec())
                }
            }
            _ => ResponseTemplate::new(404),
        };

        response.set_delay(delay)
    }
}

/// Start a fake content host; `mc-mods/` under its URI is the project base.
pub async fn fake_host(failing_project: Option<u64>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(FakeHost { failing_project })
        .mount(&server)
        .await;
    server
}
