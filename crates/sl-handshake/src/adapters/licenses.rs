//! Fixed license table keyed by customer email.

use crate::domain::entities::License;
use crate::ports::outbound::{LicenseSource, RemoteError};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct StaticLicenseSource {
    by_email: HashMap<String, Vec<License>>,
}

impl StaticLicenseSource {
    pub fn new(by_email: HashMap<String, Vec<License>>) -> Self {
        Self {
            by_email: by_email
                .into_iter()
                .map(|(email, licenses)| (email.trim().to_lowercase(), licenses))
                .collect(),
        }
    }

    /// Parse `{"email": [{"key": "..", "status": ".."}]}`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

impl LicenseSource for StaticLicenseSource {
    fn licenses_for(&self, email: &str) -> Result<Vec<License>, RemoteError> {
        Ok(self
            .by_email
            .get(&email.trim().to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}
