//! Certifications page: stats, web certificate and PDF download.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::models::{Certificate, CertificationStats};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::download::{DownloadSource, DownloadTarget, DownloadTracker, FileSink};
use crate::error::AppError;

/// Certificate endpoints. The PDF rendition is opened through
/// [`DownloadSource`] with [`DownloadTarget::Certificate`].
pub trait CertificationSource: DownloadSource + 'static {
    fn certification_stats(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<CertificationStats, ApiError>> + Send;

    fn certificate(
        &self,
        token: &BearerToken,
        sound_id: DbId,
    ) -> impl Future<Output = Result<Certificate, ApiError>> + Send;
}

pub struct CertificationsAdmin<S, K> {
    ctx: AppContext,
    source: Arc<S>,
    downloads: DownloadTracker<K>,
    stats: RwLock<Option<CertificationStats>>,
}

impl<S: CertificationSource, K: FileSink> CertificationsAdmin<S, K> {
    pub fn new(ctx: AppContext, source: Arc<S>, downloads: DownloadTracker<K>) -> Self {
        Self {
            ctx,
            source,
            downloads,
            stats: RwLock::new(None),
        }
    }

    pub fn downloads(&self) -> &DownloadTracker<K> {
        &self.downloads
    }

    pub async fn stats(&self) -> Option<CertificationStats> {
        self.stats.read().await.clone()
    }

    pub async fn load_stats(&self) -> Result<CertificationStats, AppError> {
        let token = self.ctx.require_admin().await?;
        match self.source.certification_stats(&token).await {
            Ok(stats) => {
                *self.stats.write().await = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    pub async fn view_certificate(&self, sound_id: DbId) -> Result<Certificate, AppError> {
        let token = self.ctx.require_admin().await?;
        match self.source.certificate(&token, sound_id).await {
            Ok(certificate) => Ok(certificate),
            Err(e) => {
                tracing::warn!(sound_id, error = %e, "Certificate unavailable");
                Err(self.ctx.report(AppError::Api(e)).await)
            }
        }
    }

    /// Save the PDF certificate through the download flow.
    pub async fn download_pdf(&self, sound_id: DbId, title: &str) -> Result<PathBuf, AppError> {
        let stem = format!("certificat_{title}");
        self.downloads
            .download(self.source.as_ref(), DownloadTarget::Certificate(sound_id), &stem)
            .await
    }
}
