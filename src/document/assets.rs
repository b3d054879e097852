use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::OnceCell;

/// Company logo as a `data:` URI, set once at start-up.
static COMPANY_LOGO: OnceCell<Option<String>> = OnceCell::new();

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn data_uri(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes))
}

/// Loads the logo from `path`. A missing or unreadable file only costs the
/// logo; documents still render without it.
pub fn init_company_logo(path: Option<&str>) {
    let logo = path.and_then(|p| {
        let path = Path::new(p);
        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), size = bytes.len(), "Company logo loaded");
                Some(data_uri(path, &bytes))
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Company logo not readable");
                None
            }
        }
    });

    if COMPANY_LOGO.set(logo).is_err() {
        tracing::warn!("Company logo already initialized");
    }
}

pub fn company_logo() -> Option<&'static str> {
    COMPANY_LOGO.get().and_then(|logo| logo.as_deref())
}
