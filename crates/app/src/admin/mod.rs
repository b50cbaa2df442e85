//! Admin dashboards: categories, payments, analytics and certifications.

pub mod analytics;
pub mod categories;
pub mod certifications;
pub mod payments;

pub use analytics::{AnalyticsDashboard, AnalyticsSource, Section};
pub use categories::{CategoryAdmin, CategoryAdminSource};
pub use certifications::{CertificationSource, CertificationsAdmin};
pub use payments::{PaymentSource, PaymentsAdmin};
