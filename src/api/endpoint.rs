//! Release routes of the hosted REST API.
//!
//! Each route is one row of a `{name -> template}` table; arity comes from the
//! template itself. Callers render a route through [`Endpoint::path`] instead
//! of hand-building strings.

use std::fmt;
use std::str::FromStr;

use crate::error::TemplateArityError;

use super::template::ResourcePath;

/// Accept profile for the stable JSON representation.
pub const ACCEPT_STABLE: &str = "application/vnd.github.v3+json";

/// Accept profile for raw asset bytes.
pub const ACCEPT_OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Releases,
    ReleasesByRepositoryId,
    Release,
    LatestRelease,
    ReleaseByTag,
    ReleaseAssets,
    ReleaseAssetsByRepositoryId,
    ReleaseAsset,
    ReleaseAssetByRepositoryId,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::Releases,
        Endpoint::ReleasesByRepositoryId,
        Endpoint::Release,
        Endpoint::LatestRelease,
        Endpoint::ReleaseByTag,
        Endpoint::ReleaseAssets,
        Endpoint::ReleaseAssetsByRepositoryId,
        Endpoint::ReleaseAsset,
        Endpoint::ReleaseAssetByRepositoryId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Releases => "releases",
            Endpoint::ReleasesByRepositoryId => "releases_by_repository_id",
            Endpoint::Release => "release",
            Endpoint::LatestRelease => "latest_release",
            Endpoint::ReleaseByTag => "release_by_tag",
            Endpoint::ReleaseAssets => "release_assets",
            Endpoint::ReleaseAssetsByRepositoryId => "release_assets_by_repository_id",
            Endpoint::ReleaseAsset => "release_asset",
            Endpoint::ReleaseAssetByRepositoryId => "release_asset_by_repository_id",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Endpoint::Releases => "repos/{0}/{1}/releases",
            Endpoint::ReleasesByRepositoryId => "repositories/{0}/releases",
            Endpoint::Release => "repos/{0}/{1}/releases/{2}",
            Endpoint::LatestRelease => "repos/{0}/{1}/releases/latest",
            Endpoint::ReleaseByTag => "repos/{0}/{1}/releases/tags/{2}",
            Endpoint::ReleaseAssets => "repos/{0}/{1}/releases/{2}/assets",
            Endpoint::ReleaseAssetsByRepositoryId => "repositories/{0}/releases/{1}/assets",
            Endpoint::ReleaseAsset => "repos/{0}/{1}/releases/assets/{2}",
            Endpoint::ReleaseAssetByRepositoryId => "repositories/{0}/releases/assets/{1}",
        }
    }

    pub fn arity(self) -> Result<usize, TemplateArityError> {
        Ok(ResourcePath::parse(self.template())?.arity())
    }

    /// Renders this route into a request target relative to the API root.
    pub fn path(self, args: &[&dyn fmt::Display]) -> Result<String, TemplateArityError> {
        ResourcePath::parse(self.template())?.render(args)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Endpoint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown endpoint: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_arity() {
        assert_eq!(Endpoint::Releases.arity(), Ok(2));
        assert_eq!(Endpoint::ReleasesByRepositoryId.arity(), Ok(1));
        assert_eq!(Endpoint::LatestRelease.arity(), Ok(2));
        assert_eq!(Endpoint::ReleaseAssets.arity(), Ok(3));
        assert_eq!(Endpoint::ReleaseAssetByRepositoryId.arity(), Ok(2));
    }

    #[test]
    fn test_every_route_template_is_well_formed() {
        for endpoint in Endpoint::ALL {
            let template = ResourcePath::parse(endpoint.template());
            assert!(template.is_ok(), "{endpoint}: {template:?}");
        }
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(
            Endpoint::ReleaseAssets.path(&[&"o", &"r", &7u64]).unwrap(),
            "repos/o/r/releases/7/assets"
        );
        assert_eq!(
            Endpoint::ReleaseAsset.path(&[&"o", &"r", &99u64]).unwrap(),
            "repos/o/r/releases/assets/99"
        );
        assert_eq!(
            Endpoint::ReleaseByTag.path(&[&"o", &"r", &"v1.0/beta"]).unwrap(),
            "repos/o/r/releases/tags/v1.0%2Fbeta"
        );
    }

    #[test]
    fn test_endpoint_wrong_arity() {
        assert!(Endpoint::Releases.path(&[&"only-owner"]).is_err());
    }

    #[test]
    fn test_endpoint_names_round_trip_through_table() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.name().parse::<Endpoint>().unwrap(), endpoint);
        }
        assert!("issues".parse::<Endpoint>().is_err());
    }
}
