// Domain and site lookups
//
// Both registries are organization-scoped. Sites are looked up one name at
// a time; domains are listed in full.

use tracing::debug;

use crate::client::{PangolinClient, require_data};
use crate::error::Error;
use crate::models::{DomainList, DomainSummary, SiteDetail};

impl PangolinClient {
    /// List the domains registered for the organization.
    ///
    /// `GET org/{org}/domains`
    pub async fn list_domains(&self) -> Result<Vec<DomainSummary>, Error> {
        let url = self.org_url(&["domains"]);
        debug!("listing domains");
        let list: Option<DomainList> = self.get(url).await?;
        Ok(list.unwrap_or_default().domains)
    }

    /// Look up a site by its name.
    ///
    /// `GET org/{org}/site/{siteName}`
    pub async fn get_site(&self, name: &str) -> Result<SiteDetail, Error> {
        let url = self.org_url(&["site", name]);
        debug!(site = name, "looking up site");
        let site: Option<SiteDetail> = self.get(url).await?;
        require_data(site, "site lookup")
    }
}
