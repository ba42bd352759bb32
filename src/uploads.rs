//! Contract document storage on the local filesystem

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Public URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Accepted extensions and their content types
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// Stored upload as returned to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub file_name: String,
    pub original_name: String,
    pub content_type: &'static str,
    pub size: usize,
}

/// Content type for an allowed file name, by extension
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, content_type)| *content_type)
}

/// Unique stored name keeping the original extension
pub fn stored_name(original: &str) -> Result<(String, &'static str)> {
    let content_type = content_type_for(original)
        .ok_or_else(|| AppError::bad_request("Tipo de arquivo não permitido. Use PDF, PNG ou JPEG"))?;
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    Ok((format!("{}.{}", Uuid::new_v4().simple(), ext), content_type))
}

/// A bare file name with no path components
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Write an upload into `dir`
pub async fn save(dir: &Path, original_name: &str, bytes: &[u8], max_bytes: usize) -> Result<UploadedFile> {
    if bytes.is_empty() {
        return Err(AppError::bad_request("Arquivo vazio"));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::bad_request("Arquivo excede o tamanho máximo permitido"));
    }

    let (file_name, content_type) = stored_name(original_name)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("create upload dir: {}", e)))?;
    tokio::fs::write(dir.join(&file_name), bytes)
        .await
        .map_err(|e| AppError::Internal(format!("write upload: {}", e)))?;

    info!("Stored upload {} ({} bytes) as {}", original_name, bytes.len(), file_name);

    Ok(UploadedFile {
        url: format!("{}/{}", PUBLIC_PREFIX, file_name),
        file_name,
        original_name: original_name.to_string(),
        content_type,
        size: bytes.len(),
    })
}

/// Remove a stored upload; unknown names are 404
pub async fn delete(dir: &Path, name: &str) -> Result<()> {
    if !is_safe_name(name) {
        return Err(AppError::NotFound("Arquivo não encontrado"));
    }

    match tokio::fs::remove_file(dir.join(name)).await {
        Ok(()) => {
            info!("Deleted upload {}", name);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound("Arquivo não encontrado")),
        Err(e) => Err(AppError::Internal(format!("delete upload: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("contrato.PDF"), Some("application/pdf"));
        assert_eq!(content_type_for("foto.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for("script.sh"), None);
        assert_eq!(content_type_for("semextensao"), None);
    }

    #[test]
    fn test_safe_names() {
        assert!(is_safe_name("3f2a9c.pdf"));
        assert!(!is_safe_name("../etc/passwd"));
        assert!(!is_safe_name("a/b.pdf"));
        assert!(!is_safe_name(".env"));
        assert!(!is_safe_name(""));
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4().simple()));

        let stored = save(&dir, "Contrato Assinado.pdf", b"%PDF-1.4", 1024).await.unwrap();
        assert!(stored.file_name.ends_with(".pdf"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        assert!(dir.join(&stored.file_name).exists());

        delete(&dir, &stored.file_name).await.unwrap();
        assert!(!dir.join(&stored.file_name).exists());

        let missing = delete(&dir, &stored.file_name).await.err().unwrap();
        assert_eq!(missing.status(), axum::http::StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_rejects_oversized_and_wrong_type() {
        let dir = std::env::temp_dir();
        assert!(save(&dir, "big.pdf", &[0u8; 16], 8).await.is_err());
        assert!(save(&dir, "virus.exe", b"MZ", 1024).await.is_err());
    }
}
