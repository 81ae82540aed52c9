//! Zone lookup through the AWS CLI.

use super::{cli, ZoneProvider};
use crate::error::{TopologyError, TopologyResult};
use serde::Deserialize;

/// Shape of `aws ec2 describe-availability-zones --output json`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeZonesOutput {
    availability_zones: Vec<ZoneRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ZoneRecord {
    zone_name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zone_type: Option<String>,
}

/// Lists zones with `aws ec2 describe-availability-zones`.
#[derive(Debug, Clone, Default)]
pub struct AwsCliZones {
    /// Optional named profile passed as `--profile`.
    pub profile: Option<String>,
}

impl AwsCliZones {
    pub fn new(profile: Option<&str>) -> AwsCliZones {
        AwsCliZones {
            profile: profile.map(str::to_string),
        }
    }

    fn command(&self, region: &str) -> String {
        let mut cmd = format!(
            "aws ec2 describe-availability-zones --region {region} --filters Name=state,Values=available --output json"
        );
        if let Some(profile) = &self.profile {
            cmd.push_str(&format!(" --profile {profile}"));
        }
        cmd
    }
}

impl ZoneProvider for AwsCliZones {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        let output = cli::run(&self.command(region))?;
        let zones = parse_zone_names(&output)?;
        log::info!("AWS CLI listed {} zones for {region}: {zones:?}", zones.len());
        Ok(zones)
    }
}

/// Extract the available standard zone names, in API order.
///
/// Local zones and wavelength zones are skipped; subnets of a standard VPC
/// layout only go into regular availability zones.
pub fn parse_zone_names(json: &str) -> TopologyResult<Vec<String>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let parsed: DescribeZonesOutput = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| {
            log::error!("OUTPUT START:\n\n{json}\n\nOUTPUT END\n");
            TopologyError::ZoneLookup(format!(
                "unexpected describe-availability-zones output: path={} error={}",
                e.path(),
                e.inner()
            ))
        })?;

    Ok(parsed
        .availability_zones
        .into_iter()
        .filter(|z| z.state.as_deref().map_or(true, |s| s == "available"))
        .filter(|z| {
            z.zone_type
                .as_deref()
                .map_or(true, |t| t == "availability-zone")
        })
        .map(|z| z.zone_name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "AvailabilityZones": [
            {"State": "available", "ZoneName": "eu-west-1a", "ZoneId": "euw1-az1", "ZoneType": "availability-zone"},
            {"State": "available", "ZoneName": "eu-west-1b", "ZoneId": "euw1-az2", "ZoneType": "availability-zone"},
            {"State": "impaired", "ZoneName": "eu-west-1c", "ZoneId": "euw1-az3", "ZoneType": "availability-zone"},
            {"State": "available", "ZoneName": "eu-west-1-lhr-1a", "ZoneType": "local-zone"}
        ]
    }"#;

    #[test]
    fn test_parse_zone_names() {
        let zones = parse_zone_names(SAMPLE).unwrap();
        assert_eq!(zones, vec!["eu-west-1a", "eu-west-1b"]);
    }

    #[test]
    fn test_parse_minimal_records() {
        let zones = parse_zone_names(r#"{"AvailabilityZones": [{"ZoneName": "x1a"}]}"#).unwrap();
        assert_eq!(zones, vec!["x1a"]);
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_zone_names(r#"{"Zones": []}"#).unwrap_err();
        assert!(matches!(err, TopologyError::ZoneLookup(_)));
    }

    #[test]
    fn test_command_line() {
        let cmd = AwsCliZones::new(Some("ops")).command("eu-west-1");
        assert!(cmd.starts_with("aws ec2 describe-availability-zones --region eu-west-1"));
        assert!(cmd.ends_with("--profile ops"));
    }
}
