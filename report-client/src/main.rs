use anyhow::Context;
use report_client::config::get_configuration;
use report_client::{ImageFile, RelayClient, UploadPolicy, Uploader};
use service_core::observability::init_tracing_with_writer;
use std::path::Path;

/// MIME type a file picker would report for common image extensions.
fn declared_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = get_configuration().context("Failed to read configuration")?;
    // stdout carries the rendered report.
    init_tracing_with_writer("report-client", &settings.log_level, None, std::io::stderr);

    let path = std::env::args()
        .nth(1)
        .context("usage: report-client <report-image>")?;
    let path = Path::new(&path);

    let mut uploader = Uploader::new(
        RelayClient::new(settings.relay_url.clone()),
        UploadPolicy {
            max_bytes: settings.max_upload_bytes,
        },
    );

    let file = ImageFile::from_path(path, declared_mime_type(path))
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    uploader.select_file(file).await?;
    uploader.analyze().await?;

    if let Some(analysis) = &uploader.state().analysis {
        println!("{}", analysis.html);
        println!("<p><strong>Disclaimer:</strong> {}</p>", analysis.disclaimer);
    }

    Ok(())
}
