//! Route lookup.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted by prefix length at build time; the first match is the
//!   longest one
//! - Explicit no-match rather than silent default

use std::str::FromStr;

use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::config::RouteConfig;
use crate::routing::matcher::{rewrite_path, PathPrefixMatcher};

/// Error building the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route '{route}': invalid upstream URL: {source}")]
    Url {
        route: String,
        #[source]
        source: url::ParseError,
    },
    #[error("route '{route}': upstream has no host")]
    NoHost { route: String },
    #[error("route '{route}': {source}")]
    Uri {
        route: String,
        #[source]
        source: InvalidUri,
    },
}

/// A compiled route table entry.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    matcher: PathPrefixMatcher,
    rewrite_prefix: String,
    authority: Authority,
    base_path: String,
    pub requires_auth: bool,
    pub websocket: bool,
}

impl Route {
    fn compile(config: RouteConfig) -> Result<Self, RouteError> {
        let url = Url::parse(&config.upstream).map_err(|source| RouteError::Url {
            route: config.name.clone(),
            source,
        })?;
        let host = url.host_str().ok_or_else(|| RouteError::NoHost {
            route: config.name.clone(),
        })?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|source| RouteError::Uri {
            route: config.name.clone(),
            source,
        })?;
        Ok(Self {
            matcher: PathPrefixMatcher::new(config.prefix),
            rewrite_prefix: config.rewrite_prefix,
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
            requires_auth: config.requires_auth,
            websocket: config.websocket,
            name: config.name,
        })
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// Upstream origin, used as the forwarded `Host`.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Path the upstream sees for an inbound path (without query).
    pub fn rewrite(&self, path: &str) -> Option<String> {
        let rest = self.matcher.strip(path)?;
        Some(format!(
            "{}{}",
            self.base_path,
            rewrite_path(&self.rewrite_prefix, rest)
        ))
    }

    /// Absolute upstream URI for an inbound URI, query preserved.
    pub fn upstream_uri(&self, inbound: &Uri) -> Option<Uri> {
        let path = self.rewrite(inbound.path())?;
        let path_and_query = match inbound.query() {
            Some(q) => format!("{}?{}", path, q),
            None => path,
        };
        let path_and_query = PathAndQuery::from_str(&path_and_query).ok()?;
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .ok()
    }
}

/// Immutable route table, matched by longest prefix.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile the route table from configuration.
    pub fn from_config(configs: Vec<RouteConfig>) -> Result<Self, RouteError> {
        let mut routes = configs
            .into_iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;
        routes.sort_by(|a, b| b.matcher.len().cmp(&a.matcher.len()));
        Ok(Self { routes })
    }

    /// Look up the route for a path.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
