//! Certification endpoints.

use sonique_core::models::{Certificate, CertificateFormat, CertificationStats};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::download::ByteStream;
use crate::error::ApiError;

impl MarketplaceApi {
    pub async fn certification_stats(&self, token: &BearerToken) -> Result<CertificationStats, ApiError> {
        Self::send_field(self.get("/api/admin/certifications/stats", Some(token)), "stats").await
    }

    /// Web rendition of a sound's certificate.
    pub async fn certificate(&self, token: &BearerToken, sound_id: DbId) -> Result<Certificate, ApiError> {
        let builder = self
            .get(&format!("/api/admin/certifications/{sound_id}/certificate"), Some(token))
            .query(&[("format", CertificateFormat::Web.as_str())]);
        Self::send_field(builder, "certificate").await
    }

    /// PDF rendition, streamed for the download tracker.
    pub async fn certificate_pdf(&self, token: &BearerToken, sound_id: DbId) -> Result<ByteStream, ApiError> {
        let builder = self
            .get(&format!("/api/admin/certifications/{sound_id}/certificate"), Some(token))
            .query(&[("format", CertificateFormat::Pdf.as_str())]);
        Self::open_stream(builder).await
    }
}
