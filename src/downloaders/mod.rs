//! Content host access
//!
//! Covers the single-resource fetcher and the URL conventions of the
//! content host:
//! - `<base>/<projectID>` redirects to the canonical project page
//! - `<canonical>/files/<fileID>/download` serves the component file
//! - modpack page URLs are pointed at their latest (or given) file

mod http;

pub use http::{fetch, file_name_from_url, FetchedFile, HttpClient};

use reqwest::Url;

/// Host whose modpack page URLs get normalized
pub const CONTENT_HOST: &str = "minecraft.curseforge.com";

/// Default base for per-project listing pages
pub const DEFAULT_PROJECT_BASE_URL: &str = "https://minecraft.curseforge.com/mc-mods/";

/// URL of the per-project listing page for a project
pub fn project_url(base_url: &str, project_id: u64) -> String {
    format!("{}{}", base_url, project_id)
}

/// Download URL for a component given its canonical project page
pub fn component_download_url(project_page: &str, file_id: u64) -> String {
    format!("{}/files/{}/download", project_page.trim_end_matches('/'), file_id)
}

/// Point a modpack URL at an actual file.
///
/// On the content host, a project URL gets `/files/latest` appended and a
/// `/files/<id>` URL gets `/download` appended. Other URLs pass unchanged.
pub fn normalize_modpack_url(url: &str) -> String {
    let is_content_host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == CONTENT_HOST))
        .unwrap_or(false);

    if !is_content_host {
        return url.to_string();
    }

    let segments: Vec<&str> = url.split('/').collect();
    let from_end = |n: usize| segments.len().checked_sub(n).map(|i| segments[i]);

    let names_file = from_end(2) == Some("files") || from_end(3) == Some("files");

    if !names_file {
        let mut normalized = url.to_string();
        if !normalized.ends_with("files") {
            normalized.push_str("/files");
        }
        if !normalized.ends_with("latest") {
            normalized.push_str("/latest");
        }
        return normalized;
    }

    let last_is_id = from_end(1)
        .map(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);

    if from_end(2) == Some("files") && last_is_id {
        format!("{}/download", url)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_and_component_urls() {
        assert_eq!(
            project_url(DEFAULT_PROJECT_BASE_URL, 238222),
            "https://minecraft.curseforge.com/mc-mods/238222"
        );
        assert_eq!(
            component_download_url("https://www.curseforge.com/minecraft/mc-mods/jei", 2803400),
            "https://www.curseforge.com/minecraft/mc-mods/jei/files/2803400/download"
        );
        assert_eq!(
            component_download_url("https://host/projects/jei/", 10),
            "https://host/projects/jei/files/10/download"
        );
    }

    #[test]
    fn test_normalize_project_page() {
        assert_eq!(
            normalize_modpack_url("https://minecraft.curseforge.com/projects/sevtech-ages"),
            "https://minecraft.curseforge.com/projects/sevtech-ages/files/latest"
        );
        assert_eq!(
            normalize_modpack_url("https://minecraft.curseforge.com/projects/sevtech-ages/files"),
            "https://minecraft.curseforge.com/projects/sevtech-ages/files/latest"
        );
    }

    #[test]
    fn test_normalize_specific_file() {
        assert_eq!(
            normalize_modpack_url("https://minecraft.curseforge.com/projects/sevtech-ages/files/2655016"),
            "https://minecraft.curseforge.com/projects/sevtech-ages/files/2655016/download"
        );
        // Already pointing at a download
        assert_eq!(
            normalize_modpack_url(
                "https://minecraft.curseforge.com/projects/sevtech-ages/files/2655016/download"
            ),
            "https://minecraft.curseforge.com/projects/sevtech-ages/files/2655016/download"
        );
        assert_eq!(
            normalize_modpack_url("https://minecraft.curseforge.com/projects/sevtech-ages/files/latest"),
            "https://minecraft.curseforge.com/projects/sevtech-ages/files/latest"
        );
    }

    #[test]
    fn test_normalize_other_hosts_untouched() {
        assert_eq!(
            normalize_modpack_url("https://example.com/packs/pack.zip"),
            "https://example.com/packs/pack.zip"
        );
        assert_eq!(normalize_modpack_url("not a url"), "not a url");
    }
}
