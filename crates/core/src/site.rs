//! Site-wide settings shown on every page.

use serde::{Deserialize, Serialize};

use crate::authorization::require;
use crate::capability::Capability;
use crate::error::CoreError;
use crate::principal::Principal;
use crate::store::Store;

/// Settings row keys in storage.
pub const SITE_LOGO_KEY: &str = "siteLogo";
pub const SITE_FAVICON_KEY: &str = "siteFavicon";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub site_logo: Option<String>,
    #[serde(default)]
    pub site_favicon: Option<String>,
}

impl SiteSettings {
    fn normalized(&self) -> Self {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            site_logo: clean(&self.site_logo),
            site_favicon: clean(&self.site_favicon),
        }
    }
}

pub struct SiteService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> SiteService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn settings(&self) -> Result<SiteSettings, CoreError> {
        Ok(self.store.site_settings().await?)
    }

    /// Replace both settings. A blank value unsets it.
    pub async fn update(
        &self,
        actor: &Principal,
        settings: &SiteSettings,
    ) -> Result<SiteSettings, CoreError> {
        require(actor, Capability::ManageSite)?;
        let settings = settings.normalized();
        self.store.save_site_settings(&settings).await?;
        tracing::info!(actor = actor.account_id, "Site settings updated");
        Ok(settings)
    }
}
