//! Deployment region/account context.

use crate::error::{TopologyError, TopologyResult};
use serde::{Deserialize, Serialize};

/// Environment variables consulted for the region, in priority order.
const REGION_VARS: [&str; 3] = ["CDK_DEFAULT_REGION", "AWS_REGION", "AWS_DEFAULT_REGION"];

/// Environment variables consulted for the account, in priority order.
const ACCOUNT_VARS: [&str; 2] = ["CDK_DEFAULT_ACCOUNT", "AWS_ACCOUNT_ID"];

/// Region and account a topology is derived for.
///
/// Only used for name generation and zone lookup, never for resource semantics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    pub region: String,
    pub account: Option<String>,
}

impl DeploymentContext {
    /// Create a context for an explicit region.
    pub fn new(region: &str) -> TopologyResult<DeploymentContext> {
        let region = region.trim();
        if region.is_empty() {
            return Err(TopologyError::InvalidConfig(
                "deployment region is empty".to_string(),
            ));
        }
        // region ends up in cache file names
        if region.contains(|c: char| c == '/' || c == '\\') || region.contains("..") {
            return Err(TopologyError::InvalidConfig(format!(
                "deployment region '{region}' contains path characters"
            )));
        }
        Ok(DeploymentContext {
            region: region.to_string(),
            account: None,
        })
    }

    /// Attach an account id.
    pub fn with_account(mut self, account: &str) -> DeploymentContext {
        self.account = Some(account.to_string());
        self
    }

    /// Resolve the context from the process environment.
    pub fn from_env() -> TopologyResult<DeploymentContext> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the context through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> TopologyResult<DeploymentContext>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(*k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let region = first_set(&REGION_VARS).ok_or_else(|| {
            TopologyError::InvalidConfig(format!(
                "deployment region not set (checked {})",
                REGION_VARS.join(", ")
            ))
        })?;
        log::debug!("Resolved deployment region '{region}' from environment");

        let mut context = DeploymentContext::new(&region)?;
        context.account = first_set(&ACCOUNT_VARS);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_region_priority() {
        let ctx = DeploymentContext::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("CDK_DEFAULT_REGION", "us-east-2"),
        ]))
        .unwrap();
        assert_eq!(ctx.region, "us-east-2");
        assert_eq!(ctx.account, None);
    }

    #[test]
    fn test_blank_region_skipped() {
        let ctx = DeploymentContext::from_lookup(lookup_from(&[
            ("CDK_DEFAULT_REGION", "  "),
            ("AWS_DEFAULT_REGION", "ap-southeast-2"),
            ("CDK_DEFAULT_ACCOUNT", "123456789012"),
        ]))
        .unwrap();
        assert_eq!(ctx.region, "ap-southeast-2");
        assert_eq!(ctx.account.as_deref(), Some("123456789012"));
    }

    #[test]
    fn test_missing_region() {
        let err = DeploymentContext::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfig(_)));
        assert!(DeploymentContext::new(" ").is_err());
    }

    #[test]
    fn test_region_with_path_characters_rejected() {
        for region in ["../x", "eu-west-1/..", "a\\b", "us..east"] {
            let err = DeploymentContext::new(region).unwrap_err();
            assert!(matches!(err, TopologyError::InvalidConfig(_)), "{region}");
        }
        let err = DeploymentContext::from_lookup(lookup_from(&[("AWS_REGION", "../etc")]))
            .unwrap_err();
        assert!(err.to_string().contains("path characters"), "{err}");
        assert_eq!(DeploymentContext::new("eu-west-1").unwrap().region, "eu-west-1");
    }
}
