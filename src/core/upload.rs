use std::path::Path;

use chrono::Utc;
use tokio::fs;

/// Per file limit for both upload categories.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// One bucket per upload category. The request field name decides which
/// policy applies and where the file lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    ProfilePhoto,
    AppointmentLetter,
}

impl UploadKind {
    pub fn bucket(&self) -> &'static str {
        match self {
            UploadKind::ProfilePhoto => "profile_photos",
            UploadKind::AppointmentLetter => "appointment_letters",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadRejection {
    UnsupportedFileType(String),
    FileTooLarge,
}

impl UploadRejection {
    pub fn message(&self) -> String {
        match self {
            UploadRejection::UnsupportedFileType(msg) => msg.clone(),
            UploadRejection::FileTooLarge => "File must not exceed 5 MiB".to_string(),
        }
    }
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Type policy first, then the size cap.
pub fn check_upload(
    kind: UploadKind,
    file_name: Option<&str>,
    content_type: Option<&str>,
    size: usize,
) -> Result<(), UploadRejection> {
    match kind {
        UploadKind::ProfilePhoto => {
            let ext = extension(file_name.unwrap_or(""));
            let ext_ok = matches!(ext.as_str(), "jpeg" | "jpg" | "png");
            let mime_ok = matches!(
                content_type,
                Some("image/jpeg") | Some("image/jpg") | Some("image/png")
            );
            if !ext_ok || !mime_ok {
                return Err(UploadRejection::UnsupportedFileType(
                    "Only JPEG, JPG, and PNG files are allowed for profile photos".to_string(),
                ));
            }
        }
        UploadKind::AppointmentLetter => {
            if content_type != Some("application/pdf") {
                return Err(UploadRejection::UnsupportedFileType(
                    "Only PDF files are allowed for appointment letters".to_string(),
                ));
            }
        }
    }
    if size > MAX_FILE_BYTES {
        return Err(UploadRejection::FileTooLarge);
    }
    Ok(())
}

/// Timestamp prefix keeps repeated uploads of the same file apart.
pub fn unique_file_name(original: Option<&str>) -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        original.unwrap_or("upload")
    )
}

/// Writes an already validated file into its bucket and returns the stored
/// path reference. Files are never removed here; a failed database write
/// afterwards leaves the file behind.
pub async fn save_upload(
    upload_dir: &str,
    kind: UploadKind,
    file_name: Option<&str>,
    data: &[u8],
) -> anyhow::Result<String> {
    let bucket = Path::new(upload_dir).join(kind.bucket());
    fs::create_dir_all(&bucket).await?;
    let stored_name = unique_file_name(file_name);
    fs::write(bucket.join(&stored_name), data).await?;
    Ok(format!(
        "{}/{}/{}",
        upload_dir.trim_end_matches('/'),
        kind.bucket(),
        stored_name
    ))
}
