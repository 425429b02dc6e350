use std::{collections::HashSet, fmt::Display, path::Path, str::FromStr};

use ptp_core::{
    config::{ClockIdentity, ClockQuality, DelayMechanism, InstanceConfig, PortConfig},
    instance::MAX_PORTS,
    time::Interval,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::{fs::read_to_string, io};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    /// Simulated run time in seconds
    #[serde(default = "default_duration")]
    pub duration: u64,
    #[serde(default)]
    pub domain: u8,
    /// Seed for the link jitter
    #[serde(default)]
    pub seed: u64,
    #[serde(rename = "clock")]
    pub clocks: Vec<ClockConfig>,
    #[serde(default, rename = "link")]
    pub links: Vec<LinkConfig>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClockKind {
    Ordinary,
    Boundary,
    Transparent,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClockConfig {
    pub name: String,
    pub kind: ClockKind,
    /// Clock identity, written big-endian into the eight identity bytes
    #[serde(default)]
    pub identity: u64,
    #[serde(default = "default_priority")]
    pub priority1: u8,
    #[serde(default = "default_priority")]
    pub priority2: u8,
    #[serde(default = "default_clock_class")]
    pub clock_class: u8,
    #[serde(default)]
    pub slave_only: bool,
    #[serde(default = "default_true")]
    pub two_step: bool,
    /// How far the oscillator runs off its nominal frequency
    #[serde(default)]
    pub frequency_error_ppm: f64,
    /// Offset of the clock from true time when the simulation starts
    #[serde(default)]
    pub initial_offset_ns: i64,
    #[serde(default, rename = "port")]
    pub ports: Vec<PortSettings>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMechanismKind {
    #[serde(rename = "e2e")]
    E2E,
    #[serde(rename = "p2p")]
    P2P,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PortSettings {
    pub number: u16,
    #[serde(default = "default_delay_mechanism")]
    pub delay_mechanism: DelayMechanismKind,
    #[serde(default = "default_announce_interval")]
    pub announce_interval: i8,
    #[serde(default)]
    pub sync_interval: i8,
    #[serde(default)]
    pub delay_req_interval: i8,
    #[serde(default = "default_receipt_timeout")]
    pub announce_receipt_timeout: u8,
    #[serde(default = "default_receipt_timeout")]
    pub sync_receipt_timeout: u8,
    #[serde(default)]
    pub master_only: bool,
}

/// A cable between two ports, written as `"clock-name:port-number"`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LinkConfig {
    pub a: PortRef,
    pub b: PortRef,
    #[serde(default)]
    pub delay_ns: u64,
    /// Upper bound of the random extra delay added to every frame
    #[serde(default)]
    pub jitter_ns: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub struct PortRef {
    pub clock: String,
    pub port: u16,
}

fn default_loglevel() -> String {
    "info".into()
}

fn default_duration() -> u64 {
    60
}

fn default_priority() -> u8 {
    128
}

fn default_clock_class() -> u8 {
    ClockQuality::default().clock_class
}

fn default_true() -> bool {
    true
}

fn default_delay_mechanism() -> DelayMechanismKind {
    DelayMechanismKind::E2E
}

fn default_announce_interval() -> i8 {
    1
}

fn default_receipt_timeout() -> u8 {
    3
}

impl FromStr for PortRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (clock, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::Invalid(format!("link end {s:?} has no port number")))?;
        let port = port
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("link end {s:?} has a bad port number")))?;

        Ok(PortRef {
            clock: clock.to_owned(),
            port,
        })
    }
}

impl TryFrom<String> for PortRef {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.clock, self.port)
    }
}

impl Config {
    /// Parse config from file
    pub async fn from_file(file: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let contents = read_to_string(file).await?;
        contents.parse()
    }

    /// Check that the config describes a network that can be simulated
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.clocks.is_empty() {
            return Err(ConfigError::Invalid("no clocks configured".into()));
        }
        if self.domain > 127 {
            return Err(ConfigError::Invalid(format!(
                "domain {} is out of range",
                self.domain
            )));
        }

        let mut names = HashSet::new();
        for clock in &self.clocks {
            if !names.insert(clock.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "clock name {:?} is used twice",
                    clock.name
                )));
            }
            clock.check(self.domain)?;
        }

        let mut linked = HashSet::new();
        for link in &self.links {
            for end in [&link.a, &link.b] {
                let clock = self
                    .clock(&end.clock)
                    .ok_or_else(|| ConfigError::Invalid(format!("link to unknown clock {end}")))?;
                if !clock.ports.iter().any(|port| port.number == end.port) {
                    return Err(ConfigError::Invalid(format!("link to unknown port {end}")));
                }
                if !linked.insert(end) {
                    return Err(ConfigError::Invalid(format!("port {end} has two links")));
                }
            }
            if link.a.clock == link.b.clock {
                log::warn!("link {} - {} loops back into one clock", link.a, link.b);
            }
        }

        Ok(())
    }

    pub fn clock(&self, name: &str) -> Option<&ClockConfig> {
        self.clocks.iter().find(|clock| clock.name == name)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::de::from_str(s)?;
        config.check()?;
        Ok(config)
    }
}

impl ClockConfig {
    fn check(&self, domain: u8) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid(format!("clock {}: {reason}", self.name));

        let port_range = match self.kind {
            ClockKind::Ordinary => 1..=1,
            ClockKind::Boundary => 1..=MAX_PORTS,
            ClockKind::Transparent => 2..=MAX_PORTS,
        };
        if !port_range.contains(&self.ports.len()) {
            return Err(invalid(&format!(
                "a {:?} clock needs {} to {} ports, found {}",
                self.kind,
                port_range.start(),
                port_range.end(),
                self.ports.len()
            )));
        }

        let mut numbers = HashSet::new();
        for port in &self.ports {
            if !numbers.insert(port.number) {
                return Err(invalid(&format!("port number {} is used twice", port.number)));
            }
            if self.kind != ClockKind::Transparent {
                port.port_config(domain)
                    .validate()
                    .map_err(|_| invalid(&format!("port {} is misconfigured", port.number)))?;
            } else if port.number == 0 || port.number == 0xffff {
                return Err(invalid(&format!("port number {} is reserved", port.number)));
            }
        }

        if self.kind == ClockKind::Transparent {
            if self
                .ports
                .iter()
                .any(|port| port.delay_mechanism == DelayMechanismKind::P2P)
            {
                return Err(invalid("only end to end transparent clocks are simulated"));
            }
        } else if self.identity == 0 {
            return Err(invalid("needs a non-zero identity"));
        }

        if !self.frequency_error_ppm.is_finite() || self.frequency_error_ppm.abs() > 500.0 {
            return Err(invalid("frequency error must be within 500 ppm"));
        }

        Ok(())
    }

    pub fn instance_config(&self, domain: u8) -> InstanceConfig {
        InstanceConfig {
            priority_1: self.priority1,
            priority_2: self.priority2,
            domain_number: domain,
            slave_only: self.slave_only,
            clock_quality: ClockQuality {
                clock_class: self.clock_class,
                ..Default::default()
            },
            two_step: self.two_step,
            ..InstanceConfig::new(ClockIdentity(self.identity.to_be_bytes()))
        }
    }
}

impl PortSettings {
    pub fn port_config(&self, domain: u8) -> PortConfig {
        let interval = Interval::from_log_2(self.delay_req_interval);
        PortConfig {
            port_number: self.number,
            domain_number: domain,
            announce_interval: Interval::from_log_2(self.announce_interval),
            sync_interval: Interval::from_log_2(self.sync_interval),
            delay_mechanism: match self.delay_mechanism {
                DelayMechanismKind::E2E => DelayMechanism::E2E { interval },
                DelayMechanismKind::P2P => DelayMechanism::P2P { interval },
            },
            announce_receipt_timeout: self.announce_receipt_timeout,
            sync_receipt_timeout: self.sync_receipt_timeout,
            master_only: self.master_only,
            ..Default::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error while reading config: {0}")]
    Io(#[from] io::Error),
    #[error("config toml parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CLOCKS: &str = r#"
        duration = 30

        [[clock]]
        name = "gm"
        kind = "ordinary"
        identity = 1
        priority1 = 64
        clock-class = 6

        [[clock.port]]
        number = 1

        [[clock]]
        name = "slave"
        kind = "ordinary"
        identity = 2
        frequency-error-ppm = 20.0
        initial-offset-ns = 3000000

        [[clock.port]]
        number = 1
        delay-mechanism = "p2p"
        sync-interval = -1

        [[link]]
        a = "gm:1"
        b = "slave:1"
        delay-ns = 5000
    "#;

    #[test]
    fn parses_a_network() {
        let config: Config = TWO_CLOCKS.parse().unwrap();

        assert_eq!(config.loglevel, "info");
        assert_eq!(config.duration, 30);
        assert_eq!(config.clocks.len(), 2);
        assert_eq!(config.links[0].a, "gm:1".parse().unwrap());
        assert_eq!(config.links[0].delay_ns, 5000);

        let gm = config.clock("gm").unwrap().instance_config(config.domain);
        assert_eq!(gm.priority_1, 64);
        assert_eq!(gm.priority_2, 128);
        assert_eq!(gm.clock_quality.clock_class, 6);
        assert_eq!(gm.clock_identity, ClockIdentity([0, 0, 0, 0, 0, 0, 0, 1]));
        assert!(gm.two_step);

        let slave = config.clock("slave").unwrap();
        assert_eq!(slave.frequency_error_ppm, 20.0);
        let port = slave.ports[0].port_config(config.domain);
        assert_eq!(port.sync_interval, Interval::from_log_2(-1));
        assert_eq!(port.announce_interval, Interval::TWO_SECONDS);
        assert!(matches!(port.delay_mechanism, DelayMechanism::P2P { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Config::from_str("frobnicate = 1\n[[clock]]\nname = \"a\"\nkind = \"ordinary\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn link_ends_need_a_port_number() {
        assert!("gm".parse::<PortRef>().is_err());
        assert!("gm:x".parse::<PortRef>().is_err());
        assert_eq!(
            "bc:one:2".parse::<PortRef>().unwrap(),
            PortRef {
                clock: "bc:one".into(),
                port: 2
            }
        );
    }

    fn check(config: &str) -> Result<Config, ConfigError> {
        config.parse()
    }

    #[test]
    fn bad_networks_are_rejected() {
        let ordinary_without_port = r#"
            [[clock]]
            name = "a"
            kind = "ordinary"
            identity = 1
        "#;
        let duplicate_name = r#"
            [[clock]]
            name = "a"
            kind = "ordinary"
            identity = 1
            [[clock.port]]
            number = 1
            [[clock]]
            name = "a"
            kind = "ordinary"
            identity = 2
            [[clock.port]]
            number = 1
        "#;
        let missing_identity = r#"
            [[clock]]
            name = "a"
            kind = "boundary"
            [[clock.port]]
            number = 1
        "#;
        let dangling_link = r#"
            [[clock]]
            name = "a"
            kind = "ordinary"
            identity = 1
            [[clock.port]]
            number = 1
            [[link]]
            a = "a:1"
            b = "b:1"
        "#;
        let bad_interval = r#"
            [[clock]]
            name = "a"
            kind = "ordinary"
            identity = 1
            [[clock.port]]
            number = 1
            sync-interval = 9
        "#;
        let peer_to_peer_transparent = r#"
            [[clock]]
            name = "tc"
            kind = "transparent"
            [[clock.port]]
            number = 1
            delay-mechanism = "p2p"
            [[clock.port]]
            number = 2
        "#;

        for config in [
            ordinary_without_port,
            duplicate_name,
            missing_identity,
            dangling_link,
            bad_interval,
            peer_to_peer_transparent,
        ] {
            assert!(
                matches!(check(config), Err(ConfigError::Invalid(_))),
                "{config}"
            );
        }
    }

    #[test]
    fn ports_take_one_link_each() {
        let config = r#"
            [[clock]]
            name = "a"
            kind = "boundary"
            identity = 1
            [[clock.port]]
            number = 1
            [[clock.port]]
            number = 2
            [[clock]]
            name = "b"
            kind = "ordinary"
            identity = 2
            [[clock.port]]
            number = 1
            [[link]]
            a = "a:1"
            b = "b:1"
            [[link]]
            a = "a:2"
            b = "b:1"
        "#;
        assert!(matches!(check(config), Err(ConfigError::Invalid(_))));
    }
}
